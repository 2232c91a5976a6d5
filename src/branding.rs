//! Maps institution names to display branding (color and logo).

use serde::Serialize;

/// Display branding for a financial institution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Branding {
    /// The institution's brand color as a hex string, e.g. "#117DBA".
    pub color: &'static str,
    /// A URL for the institution's logo.
    pub logo_url: &'static str,
}

const DEFAULT_BRANDING: Branding = Branding {
    color: "#6D8299",
    logo_url: "https://logo.clearbit.com/bank.com",
};

/// Look up the branding for an institution by name.
///
/// The name is matched case-insensitively with whitespace collapsed to
/// underscores, so "Bank of America", "bank_of_america", and "BANK OF AMERICA"
/// all resolve to the same entry. Unknown institutions get a neutral default.
pub fn institution_branding(institution_name: &str) -> Branding {
    let normalized = institution_name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");

    match normalized.as_str() {
        "chase" => Branding {
            color: "#117DBA",
            logo_url: "https://www.chase.com/favicon.ico",
        },
        "bofa" | "bank_of_america" => Branding {
            color: "#C41E3A",
            logo_url: "https://www.bankofamerica.com/favicon.ico",
        },
        "wellsfargo" | "wells_fargo" => Branding {
            color: "#C60C30",
            logo_url: "https://www.wellsfargo.com/favicon.ico",
        },
        "citi" => Branding {
            color: "#1E90FF",
            logo_url: "https://www.citi.com/favicon.ico",
        },
        "capital_one" => Branding {
            color: "#E31937",
            logo_url: "https://www.capitalone.com/favicon.ico",
        },
        "amex" | "american_express" => Branding {
            color: "#006FCF",
            logo_url: "https://www.americanexpress.com/favicon.ico",
        },
        "discover" => Branding {
            color: "#FF6000",
            logo_url: "https://www.discover.com/favicon.ico",
        },
        "usbank" | "us_bank" => Branding {
            color: "#003478",
            logo_url: "https://www.usbank.com/favicon.ico",
        },
        _ => DEFAULT_BRANDING,
    }
}
