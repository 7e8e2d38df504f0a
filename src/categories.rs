/// A fixed evaluation dimension. `key` names the `nota_<key>` / `comentario_<key>`
/// column pair of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub key: &'static str,
    pub name: &'static str,
    pub group: Option<&'static str>,
}

impl Category {
    pub fn rating_field(&self) -> String {
        format!("nota_{}", self.key)
    }

    pub fn comment_field(&self) -> String {
        format!("comentario_{}", self.key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryGroup {
    pub key: &'static str,
    pub name: &'static str,
}

pub const GROUPS: &[CategoryGroup] = &[
    CategoryGroup { key: "gestao", name: "Gestão e Administração" },
    CategoryGroup { key: "infraestrutura", name: "Infraestrutura e Recursos" },
    CategoryGroup { key: "docentes", name: "Corpo Docente" },
    CategoryGroup { key: "conteudo", name: "Conteúdo do Curso" },
];

pub const CATEGORIES: &[Category] = &[
    Category { key: "infraestrutura", name: "Infraestrutura", group: Some("infraestrutura") },
    Category { key: "coordenacao", name: "Coordenação", group: Some("gestao") },
    Category { key: "direcao", name: "Direção", group: Some("gestao") },
    Category { key: "localizacao", name: "Localização", group: Some("infraestrutura") },
    Category { key: "acessibilidade", name: "Acessibilidade", group: Some("infraestrutura") },
    Category { key: "equipamentos", name: "Equipamentos", group: Some("infraestrutura") },
    Category { key: "biblioteca", name: "Biblioteca", group: Some("infraestrutura") },
    Category { key: "didatica", name: "Didática dos Professores", group: Some("docentes") },
    Category { key: "conteudo", name: "Conteúdo do Curso", group: Some("conteudo") },
    Category {
        key: "dinamica_professores",
        name: "Dinâmica dos Professores",
        group: Some("docentes"),
    },
    Category {
        key: "disponibilidade_professores",
        name: "Disponibilidade dos Professores",
        group: Some("docentes"),
    },
];

/// Read-only category configuration shared by every stage of a run.
#[derive(Debug, Clone, Copy)]
pub struct Registry {
    categories: &'static [Category],
    groups: &'static [CategoryGroup],
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(CATEGORIES, GROUPS)
    }
}

impl Registry {
    pub fn new(categories: &'static [Category], groups: &'static [CategoryGroup]) -> Self {
        Self { categories, groups }
    }

    pub fn categories(&self) -> &'static [Category] {
        self.categories
    }

    pub fn groups(&self) -> &'static [CategoryGroup] {
        self.groups
    }

    pub fn get(&self, key: &str) -> Option<&'static Category> {
        self.categories.iter().find(|category| category.key == key)
    }

    pub fn group_of(&self, key: &str) -> Option<&'static CategoryGroup> {
        let group_key = self.get(key)?.group?;
        self.groups.iter().find(|group| group.key == group_key)
    }

    pub fn members<'a>(&'a self, group_key: &'a str) -> impl Iterator<Item = &'static Category> + 'a {
        self.categories
            .iter()
            .filter(move |category| category.group == Some(group_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique() {
        let registry = Registry::default();
        let mut keys: Vec<&str> = registry.categories().iter().map(|c| c.key).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), registry.categories().len());
    }

    #[test]
    fn field_names_follow_column_convention() {
        let registry = Registry::default();
        let category = registry.get("didatica").unwrap();
        assert_eq!(category.rating_field(), "nota_didatica");
        assert_eq!(category.comment_field(), "comentario_didatica");
    }

    #[test]
    fn every_category_belongs_to_a_known_group() {
        let registry = Registry::default();
        for category in registry.categories() {
            assert!(registry.group_of(category.key).is_some(), "{}", category.key);
        }
        let docentes: Vec<&str> = registry.members("docentes").map(|c| c.key).collect();
        assert_eq!(
            docentes,
            vec!["didatica", "dinamica_professores", "disponibilidade_professores"]
        );
    }
}
