use once_cell::sync::Lazy;
use regex::Regex;

/// The 19 Ohio constitution articles, keyed by Roman numeral.
/// Grounded in `ohio_constitution_mapping.py`'s `OHIO_CONSTITUTION_ARTICLES`.
pub static ARTICLE_NAMES: &[(&str, &str)] = &[
    ("I", "Article I - Bill of Rights"),
    ("II", "Article II - Legislative"),
    ("III", "Article III - Executive"),
    ("IV", "Article IV - Judicial"),
    ("V", "Article V - Elective Franchise"),
    ("VI", "Article VI - Education"),
    ("VII", "Article VII - Public Institutions"),
    ("VIII", "Article VIII - Public Debt and Public Works"),
    ("IX", "Article IX - Militia"),
    ("X", "Article X - County and Township Organizations"),
    ("XI", "Article XI - Apportionment"),
    ("XII", "Article XII - Finance and Taxation"),
    ("XIII", "Article XIII - Corporations"),
    ("XIV", "Article XIV - Jurisprudence"),
    ("XV", "Article XV - Miscellaneous"),
    ("XVI", "Article XVI - Amendments"),
    ("XVII", "Article XVII - Elections"),
    ("XVIII", "Article XVIII - Municipal Corporations"),
    ("XIX", "Article XIX - Initiative and Referendum"),
];

/// Section-number -> rights category for Article I (Bill of Rights).
pub static BILL_OF_RIGHTS_CATEGORIES: &[(&str, &str)] = &[
    ("1", "inalienable_rights"),
    ("2", "government_powers"),
    ("3", "religious_freedom"),
    ("4", "habeas_corpus"),
    ("5", "trial_by_jury"),
    ("6", "slavery_prohibition"),
    ("7", "political_rights"),
    ("8", "writ_of_habeas_corpus"),
    ("9", "bail_and_punishment"),
    ("10", "criminal_procedure"),
    ("11", "free_speech"),
    ("12", "assembly_and_petition"),
    ("13", "quartering_soldiers"),
    ("14", "search_and_seizure"),
    ("15", "grand_jury"),
    ("16", "criminal_justice"),
    ("17", "civil_trials"),
    ("18", "suspension_of_laws"),
    ("19", "eminent_domain"),
    ("20", "powers_reserved"),
];

/// Matches the canonical long form (`"Article I, Section 1"`) as well as
/// the bare `"I.1"` shorthand, so callers can parse either a stored
/// section id or a pre-normalization in-text match.
static ARTICLE_SECTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:Article\s+)?([IVXLCDM]+)(?:,?\s*Section\s+|\.)\s*(\d+[a-z]?)").unwrap()
});

/// Parses a constitution id (long form `"Article I, Section 1"` or
/// shorthand `"I.1"`) into (article roman numeral, section number).
pub fn parse_article_section(bare_id: &str) -> Option<(String, String)> {
    let caps = ARTICLE_SECTION_RE.captures(bare_id)?;
    Some((
        caps.get(1)?.as_str().to_uppercase(),
        caps.get(2)?.as_str().to_string(),
    ))
}

/// Formats the canonical long-form bare id for a parsed article/section.
pub fn long_form_id(article: &str, section_num: &str) -> String {
    format!("Article {}, Section {}", article.to_uppercase(), section_num)
}

pub fn article_name(article: &str) -> Option<&'static str> {
    ARTICLE_NAMES
        .iter()
        .find(|(num, _)| *num == article)
        .map(|(_, name)| *name)
}

/// Maps an article name to its category, per
/// `ohio_constitution_mapping.py::get_article_category`.
pub fn article_category(article_name: &str) -> &'static str {
    if article_name.contains("Bill of Rights") {
        "bill_of_rights"
    } else if article_name.contains("Legislative") {
        "legislative_branch"
    } else if article_name.contains("Executive") {
        "executive_branch"
    } else if article_name.contains("Judicial") {
        "judicial_branch"
    } else if article_name.contains("Education") || article_name.contains("School") {
        "education"
    } else if article_name.contains("Election") || article_name.contains("Franchise") {
        "elections"
    } else if article_name.contains("Finance")
        || article_name.contains("Revenue")
        || article_name.contains("Taxation")
    {
        "finance"
    } else if article_name.contains("Municipal") || article_name.contains("Corporation") {
        "municipal"
    } else if article_name.contains("Public") {
        "public_institutions"
    } else if article_name.contains("Amendment") || article_name.contains("Revision") {
        "amendments"
    } else {
        "other"
    }
}

pub fn government_branch(category: &str) -> Option<&'static str> {
    match category {
        "legislative_branch" => Some("legislative"),
        "executive_branch" => Some("executive"),
        "judicial_branch" => Some("judicial"),
        _ => None,
    }
}

/// Rights category for a Bill of Rights section: first by section
/// number, falling back to keyword matching in the title/text.
pub fn rights_category(section_num: &str, title: &str, text: &str) -> &'static str {
    if let Some((_, category)) = BILL_OF_RIGHTS_CATEGORIES
        .iter()
        .find(|(num, _)| *num == section_num)
    {
        return category;
    }

    let lower_title = title.to_lowercase();
    let lower_text = text.to_lowercase();
    let contains_any = |words: &[&str]| {
        words
            .iter()
            .any(|w| lower_title.contains(w) || lower_text.contains(w))
    };

    if contains_any(&["speech", "press", "expression"]) {
        "free_speech"
    } else if contains_any(&["religion", "worship"]) {
        "religious_freedom"
    } else if contains_any(&["search", "seizure", "warrant"]) {
        "search_and_seizure"
    } else if contains_any(&["jury", "trial"]) {
        "trial_by_jury"
    } else if contains_any(&["bail", "punishment", "cruel"]) {
        "bail_and_punishment"
    } else if contains_any(&["property", "eminent domain", "taking"]) {
        "eminent_domain"
    } else if contains_any(&["assembly", "petition"]) {
        "assembly_and_petition"
    } else {
        "general_rights"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_shorthand_article_section() {
        let (article, section) = parse_article_section("I.1").unwrap();
        assert_eq!(article, "I");
        assert_eq!(section, "1");
    }

    #[test]
    fn article_name_and_category_are_consistent() {
        let name = article_name("II").unwrap();
        assert_eq!(article_category(name), "legislative_branch");
        assert_eq!(government_branch("legislative_branch"), Some("legislative"));
    }

    #[test]
    fn all_nineteen_articles_present() {
        assert_eq!(ARTICLE_NAMES.len(), 19);
    }

    #[test]
    fn rights_category_prefers_section_number_lookup() {
        assert_eq!(rights_category("11", "", ""), "free_speech");
    }

    #[test]
    fn rights_category_falls_back_to_keywords() {
        assert_eq!(
            rights_category("99", "Unlisted section", "concerning search and seizure"),
            "search_and_seizure"
        );
    }

    #[test]
    fn rights_category_defaults_to_general() {
        assert_eq!(rights_category("99", "Unlisted", "nothing matches"), "general_rights");
    }
}
