//! Free-text GEO label normalization.
//!
//! Labels come from task-tracker dropdowns and hand-typed briefs:
//! `"USA"`, `".us - United States"`, `"Canada | Ontario"`, `"uk"`.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// `(alias, canonical code)`; aliases are normalized when the table loads.
const GEO_ALIASES: &[(&str, &str)] = &[
    // North America
    ("US", "US"),
    ("USA", "US"),
    ("U.S.", "US"),
    ("U.S.A.", "US"),
    ("UNITED STATES", "US"),
    ("UNITED STATES OF AMERICA", "US"),
    ("AMERICA", "US"),
    (".us", "US"),
    ("CA", "CA"),
    ("CAN", "CA"),
    ("CANADA", "CA"),
    (".ca", "CA"),
    ("CA-ON", "CA-ON"),
    ("ON", "CA-ON"),
    ("ONTARIO", "CA-ON"),
    ("CANADA ONTARIO", "CA-ON"),
    ("MX", "MX"),
    ("MEXICO", "MX"),
    (".mx", "MX"),
    // Europe
    ("UK", "UK"),
    ("GB", "UK"),
    ("GBR", "UK"),
    ("UNITED KINGDOM", "UK"),
    ("GREAT BRITAIN", "UK"),
    ("BRITAIN", "UK"),
    ("ENGLAND", "UK"),
    (".uk", "UK"),
    (".co.uk", "UK"),
    ("IE", "IE"),
    ("IRELAND", "IE"),
    (".ie", "IE"),
    ("DE", "DE"),
    ("GERMANY", "DE"),
    ("DEUTSCHLAND", "DE"),
    (".de", "DE"),
    ("AT", "AT"),
    ("AUSTRIA", "AT"),
    (".at", "AT"),
    ("CH", "CH"),
    ("SWITZERLAND", "CH"),
    (".ch", "CH"),
    ("FR", "FR"),
    ("FRANCE", "FR"),
    (".fr", "FR"),
    ("ES", "ES"),
    ("SPAIN", "ES"),
    (".es", "ES"),
    ("IT", "IT"),
    ("ITALY", "IT"),
    (".it", "IT"),
    ("PT", "PT"),
    ("PORTUGAL", "PT"),
    (".pt", "PT"),
    ("NL", "NL"),
    ("NETHERLANDS", "NL"),
    ("HOLLAND", "NL"),
    (".nl", "NL"),
    ("BE", "BE"),
    ("BELGIUM", "BE"),
    (".be", "BE"),
    ("SE", "SE"),
    ("SWEDEN", "SE"),
    (".se", "SE"),
    ("NO", "NO"),
    ("NORWAY", "NO"),
    (".no", "NO"),
    ("DK", "DK"),
    ("DENMARK", "DK"),
    (".dk", "DK"),
    ("FI", "FI"),
    ("FINLAND", "FI"),
    (".fi", "FI"),
    ("PL", "PL"),
    ("POLAND", "PL"),
    (".pl", "PL"),
    ("CZ", "CZ"),
    ("CZECHIA", "CZ"),
    ("CZECH REPUBLIC", "CZ"),
    (".cz", "CZ"),
    ("GR", "GR"),
    ("GREECE", "GR"),
    (".gr", "GR"),
    ("HU", "HU"),
    ("HUNGARY", "HU"),
    (".hu", "HU"),
    ("RO", "RO"),
    ("ROMANIA", "RO"),
    (".ro", "RO"),
    // Asia-Pacific
    ("AU", "AU"),
    ("AUS", "AU"),
    ("AUSTRALIA", "AU"),
    (".au", "AU"),
    (".com.au", "AU"),
    ("NZ", "NZ"),
    ("NEW ZEALAND", "NZ"),
    (".nz", "NZ"),
    ("JP", "JP"),
    ("JAPAN", "JP"),
    (".jp", "JP"),
    ("IN", "IN"),
    ("INDIA", "IN"),
    (".in", "IN"),
    ("SG", "SG"),
    ("SINGAPORE", "SG"),
    (".sg", "SG"),
    ("PH", "PH"),
    ("PHILIPPINES", "PH"),
    (".ph", "PH"),
    // Latin America / Africa
    ("BR", "BR"),
    ("BRAZIL", "BR"),
    ("BRASIL", "BR"),
    (".br", "BR"),
    ("AR", "AR"),
    ("ARGENTINA", "AR"),
    (".ar", "AR"),
    ("CL", "CL"),
    ("CHILE", "CL"),
    (".cl", "CL"),
    ("PE", "PE"),
    ("PERU", "PE"),
    (".pe", "PE"),
    ("CO", "CO"),
    ("COLOMBIA", "CO"),
    ("ZA", "ZA"),
    ("SOUTH AFRICA", "ZA"),
    (".za", "ZA"),
    ("NG", "NG"),
    ("NIGERIA", "NG"),
    (".ng", "NG"),
    // Multi-market
    ("WW", "WW"),
    ("WORLDWIDE", "WW"),
    ("GLOBAL", "WW"),
    ("INTERNATIONAL", "WW"),
    ("INT", "WW"),
    ("ROW", "WW"),
    ("EU", "EU"),
    ("EUROPE", "EU"),
];

static ALIASES: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    GEO_ALIASES
        .iter()
        .map(|(alias, code)| (normalize_label(alias), *code))
        .collect()
});

/// Uppercase, drop punctuation other than `-` and `|`, collapse whitespace
/// and tighten spaces around hyphens.
pub fn normalize_label(input: &str) -> String {
    let upper: String = input
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '|' {
                c.to_uppercase().next().unwrap_or(c)
            } else if c.is_whitespace() || c == '_' || c == '/' {
                ' '
            } else {
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect();

    let collapsed = upper.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .replace(" - ", "-")
        .replace("- ", "-")
        .replace(" -", "-")
        .trim_matches(|c: char| c == '-' || c == '|' || c.is_whitespace())
        .to_string()
}

/// Look up a label in the alias table without the best-effort fallback.
pub fn lookup_geo(input: &str) -> Option<&'static str> {
    let normalized = normalize_label(input);
    if normalized.is_empty() {
        return None;
    }
    if let Some(code) = ALIASES.get(&normalized) {
        return Some(code);
    }

    normalized
        .split(['-', '|'])
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .find_map(|segment| ALIASES.get(segment).copied())
}

/// Canonical code for a label, or the normalized label itself when no alias
/// matches. Never fails; an unmapped result is the caller's "needs setup".
pub fn normalize_geo(input: &str) -> String {
    lookup_geo(input)
        .map(str::to_string)
        .unwrap_or_else(|| normalize_label(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_spellings_agree() {
        assert_eq!(normalize_geo("US"), "US");
        assert_eq!(normalize_geo("USA"), "US");
        assert_eq!(normalize_geo(".us - United States"), "US");
        assert_eq!(normalize_geo("  united   states "), "US");
        assert_eq!(normalize_geo("U.S.A."), "US");
    }

    #[test]
    fn test_segments_are_tried_in_order() {
        assert_eq!(normalize_geo("Canada | Ontario"), "CA");
        assert_eq!(normalize_geo("CA-ON"), "CA-ON");
        assert_eq!(normalize_geo("Ontario"), "CA-ON");
        assert_eq!(normalize_geo("gb - great britain"), "UK");
    }

    #[test]
    fn test_unknown_label_is_returned_normalized() {
        assert_eq!(normalize_geo("atlantis!"), "ATLANTIS");
        assert_eq!(normalize_geo("new   region - x"), "NEW REGION-X");
        assert_eq!(lookup_geo("atlantis"), None);
        assert_eq!(normalize_geo(""), "");
    }

    #[test]
    fn test_canonical_codes_are_fixed_points() {
        for (_, code) in GEO_ALIASES {
            assert_eq!(normalize_geo(code), *code, "code {} is not idempotent", code);
            let once = normalize_geo(code);
            assert_eq!(normalize_geo(&once), once);
        }
        for label in ["atlantis", "x - y | z", ".zz"] {
            let once = normalize_geo(label);
            assert_eq!(normalize_geo(&once), once);
        }
    }
}
