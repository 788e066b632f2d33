use radar_core::CompanyDatabase;
use radar_dom::{Document, NodeId};

/// Builds one job-board result card: company link, role line, and the hidden
/// accessibility duplicate real listings carry.
pub fn job_card(doc: &mut Document, company: &str, role: &str) -> NodeId {
    let card = doc.create_element("li");
    doc.set_attr(card, "class", "reusable-search__result-container entity-result");
    doc.append_child(doc.body(), card).ok();

    let link = doc.create_element("a");
    doc.set_attr(link, "class", "job-card-container__company-name");
    doc.set_text(link, company);
    doc.append_child(card, link).ok();

    let role_line = doc.create_element("p");
    doc.set_text(role_line, role);
    doc.append_child(card, role_line).ok();

    let a11y = doc.create_element("span");
    doc.set_attr(a11y, "class", "visually-hidden");
    doc.set_text(a11y, &format!("View page for {}", company));
    doc.append_child(card, a11y).ok();

    card
}

pub fn demo_page() -> Document {
    let mut doc = Document::new();
    job_card(&mut doc, "Google LLC", "Senior Software Engineer");
    job_card(&mut doc, "Meta", "Product Designer");
    job_card(&mut doc, "Amazon Web Services", "Solutions Architect");
    doc
}

pub fn sample_database() -> CompanyDatabase {
    let json = serde_json::json!({
        "GOOGLE": [
            {"name": "Asha Iyer", "note": "SWE II, Cloud"},
            {"name": "Daniel Okafor", "note": "College batchmate"}
        ],
        "META": [
            {"name": "Lin Zhou", "note": "Ex-colleague, Reality Labs"}
        ],
        "AMAZON": [
            {"name": "Ravi Menon", "note": "Bar raiser, ping before applying"}
        ]
    });
    CompanyDatabase::from_value(json).expect("sample database is well-formed")
}
