//! Formatted document renderer.
//!
//! # Responsibility
//! - Walk the sanitized document and produce the plain-text export the page
//!   layout engine flows into its output.
//!
//! # Invariants
//! - Empty fields are skipped, never rendered as blank labels.
//! - Characters and plots without a world are labelled `Geral`.
//! - Hidden three-act sections are omitted entirely.
//!
//! # See also
//! - docs/architecture/export.md

use crate::model::entities::{Age, Character, Plot, Project, WorkshopData, World};

const GENERAL_WORLD_LABEL: &str = "Geral";

/// Renders the whole document as formatted text, section by section, in the
/// same order the original export walks the data: worlds, characters, plots,
/// writing projects. Empty collections are skipped.
pub fn render_document(data: &WorkshopData, exported_at: &str) -> String {
    let mut out = String::new();

    out.push_str("OFICINA DO ESCRITOR\n");
    out.push_str("Exportação de Dados\n");
    out.push_str(&format!("Exportado em: {exported_at}\n"));

    if !data.worlds.is_empty() {
        push_heading(&mut out, "Mundos");
        for world in &data.worlds {
            render_world(&mut out, world);
        }
    }

    if !data.characters.is_empty() {
        push_heading(&mut out, "Personagens");
        for character in &data.characters {
            render_character(&mut out, data, character);
        }
    }

    if !data.plots.is_empty() {
        push_heading(&mut out, "Enredos");
        for plot in &data.plots {
            render_plot(&mut out, data, plot);
        }
    }

    if !data.projects.is_empty() {
        push_heading(&mut out, "Projetos de Escrita");
        for project in &data.projects {
            render_project(&mut out, project);
        }
    }

    out
}

fn push_heading(out: &mut String, title: &str) {
    out.push_str(&format!("\n== {title} ==\n"));
}

fn push_subheading(out: &mut String, title: &str) {
    out.push_str(&format!("\n-- {title} --\n"));
}

fn push_field(out: &mut String, label: &str, value: &str) {
    let trimmed = value.trim();
    if !trimmed.is_empty() {
        out.push_str(&format!("{label}: {trimmed}\n"));
    }
}

fn world_label(data: &WorkshopData, world_id: Option<i64>) -> String {
    world_id
        .and_then(|id| data.world_name(id))
        .unwrap_or(GENERAL_WORLD_LABEL)
        .to_string()
}

fn render_world(out: &mut String, world: &World) {
    push_subheading(out, &world.name);
    if !world.description.trim().is_empty() {
        out.push_str(world.description.trim());
        out.push('\n');
    }
    if !world.articles.is_empty() {
        out.push_str("Artigos:\n");
        for article in &world.articles {
            out.push_str(&format!("  {} ({})\n", article.title, article.category));
            if !article.content.trim().is_empty() {
                out.push_str(&format!("  {}\n", article.content.trim()));
            }
        }
    }
}

fn render_character(out: &mut String, data: &WorkshopData, character: &Character) {
    push_subheading(
        out,
        &format!("{} ({})", character.name, world_label(data, character.world_id)),
    );
    match &character.age {
        Age::Years(years) => push_field(out, "Idade", &years.to_string()),
        Age::Text(text) => push_field(out, "Idade", text),
    }
    push_field(out, "Aparência", &character.appearance);
    push_field(out, "Arquétipo", &character.archetype);
    push_field(out, "Personalidade", &character.personality);
    push_field(out, "Motivação", &character.motivation);
    push_field(out, "Medos", &character.fear);
    push_field(out, "Segredos", &character.secret);
    push_field(out, "Afiliação", &character.affiliation);
    push_field(out, "Status Social", &character.social_status);
    push_field(out, "Inimigos e Aliados", &character.enemies_allies);
    push_field(out, "Poderes", &character.powers);
    push_field(out, "Fraquezas", &character.weaknesses);
    push_field(out, "Equipamento", &character.equipment);
    if !character.backstory.trim().is_empty() {
        out.push_str("História Pregressa:\n");
        out.push_str(character.backstory.trim());
        out.push('\n');
    }
}

fn render_plot(out: &mut String, data: &WorkshopData, plot: &Plot) {
    push_subheading(
        out,
        &format!("{} ({})", plot.title, world_label(data, plot.world_id)),
    );
    push_field(out, "Logline", &plot.logline);
    if !plot.three_act_structure_hidden {
        push_field(out, "Ato 1: A Apresentação", &plot.act1);
        push_field(out, "Ato 2: A Confrontação", &plot.act2);
        push_field(out, "Ato 3: A Resolução", &plot.act3);
    }
}

fn render_project(out: &mut String, project: &Project) {
    push_subheading(out, &project.title);
    for chapter in &project.chapters {
        out.push_str(&format!("Capítulo: {}\n", chapter.title));
        if !chapter.content.trim().is_empty() {
            out.push_str(chapter.content.trim());
            out.push('\n');
        }
    }
}
