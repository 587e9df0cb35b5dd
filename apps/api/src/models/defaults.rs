//! The sample document a fresh session starts from.

use crate::models::resume::{Color, ContentScale, PersonalInfo, PhotoRef, ResumeDocument, Template};
use crate::models::section::{ItemId, Section, SectionId, SectionItem, SectionType};

pub const DEFAULT_PRIMARY_COLOR: Color = Color::GRAY_800;

fn entry(id: &str, title: &str, subtitle: &str, date: &str) -> SectionItem {
    SectionItem {
        id: ItemId::new(id),
        title: Some(title.to_string()),
        subtitle: Some(subtitle.to_string()),
        date: Some(date.to_string()),
        description: None,
    }
}

fn skill(id: &str, text: &str) -> SectionItem {
    SectionItem {
        id: ItemId::new(id),
        title: None,
        subtitle: None,
        date: None,
        description: Some(text.to_string()),
    }
}

fn section(id: &str, title: &str, kind: SectionType, items: Vec<SectionItem>) -> Section {
    Section {
        id: SectionId::new(id),
        title: title.to_string(),
        kind,
        is_visible: true,
        items,
    }
}

/// Builds the starting document for a session using the given template.
pub fn default_document(template: Template) -> ResumeDocument {
    ResumeDocument {
        template,
        primary_color: DEFAULT_PRIMARY_COLOR,
        content_scale: ContentScale::IDENTITY,
        personal_info: PersonalInfo {
            full_name: "Max K. Silva".to_string(),
            title: "Jovem Aprendiz".to_string(),
            email: "exemplo@gmail.com".to_string(),
            phone: "(12) 3456-7890".to_string(),
            address: "Rua Duque de Caxias, 1, Centro - Buenos Aires, PE".to_string(),
            linkedin: Some("linkedin.com/in/max-k-silva".to_string()),
            photo: Some(PhotoRef::Remote {
                url: "https://picsum.photos/200/200".to_string(),
            }),
            summary: "Busco minha primeira oportunidade de emprego como Jovem Aprendiz, \
                      visando desenvolver habilidades profissionais e contribuir com \
                      dedicação e vontade de aprender para o crescimento da empresa."
                .to_string(),
        },
        sections: vec![
            section(
                "obj",
                "Objetivos Profissionais",
                SectionType::Text,
                vec![SectionItem {
                    id: ItemId::new("1"),
                    title: Some(String::new()),
                    subtitle: Some(String::new()),
                    date: Some(String::new()),
                    description: Some(
                        "Desenvolver habilidades em administração e atendimento ao cliente."
                            .to_string(),
                    ),
                }],
            ),
            section(
                "edu",
                "Formação",
                SectionType::Education,
                vec![entry(
                    "1",
                    "Escola Pacheco e Lacerda",
                    "Cursando 1º ano do ensino médio",
                    "2025",
                )],
            ),
            section(
                "qual",
                "Qualificações",
                SectionType::Skills,
                vec![
                    skill("1", "Facilidade em trabalhar em equipe"),
                    skill("2", "Boa comunicação"),
                    skill("3", "Habilidade em organização e pontualidade"),
                    skill("4", "Conhecimento básico em digitalização"),
                ],
            ),
            section(
                "lang",
                "Idiomas",
                SectionType::Skills,
                vec![
                    skill("1", "Português: Nativo"),
                    skill("2", "Inglês: Básico"),
                    skill("3", "Espanhol: Básico"),
                ],
            ),
            section(
                "courses",
                "Cursos",
                SectionType::Education,
                vec![
                    entry("1", "Hanover e Tavares", "Curso de Idioma (Espanhol)", "2023"),
                    entry("2", "Empresa Ícaro", "Curso Comunicação Escrita", "2020"),
                ],
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_document_uses_requested_template() {
        let doc = default_document(Template::Minimal);
        assert_eq!(doc.template, Template::Minimal);
        assert_eq!(doc.content_scale, ContentScale::IDENTITY);
    }

    #[test]
    fn test_default_document_has_unique_section_and_item_ids() {
        let doc = default_document(Template::Modern);
        let ids: HashSet<_> = doc.sections.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids.len(), doc.sections.len());
        for section in &doc.sections {
            let item_ids: HashSet<_> = section.items.iter().map(|i| i.id.clone()).collect();
            assert_eq!(item_ids.len(), section.items.len(), "section {}", section.id);
        }
    }

    #[test]
    fn test_default_document_has_two_skills_sections() {
        let doc = default_document(Template::Modern);
        let skills = doc.sections.iter().filter(|s| s.kind.is_skills()).count();
        assert_eq!(skills, 2);
    }
}
