//! Display strings shared by every front-end.
//!
//! The page is in Portuguese. Plurals follow the simple rule the page has
//! always used: singular for exactly one, plural otherwise (including zero).

use tribute_types::TimeUnit;

/// The gate heading, e.g. `Clique 3 vezes para revelar`.
pub fn reveal_prompt(remaining: u32) -> String {
    let suffix = if remaining == 1 { "" } else { "es" };
    format!("Clique {remaining} vez{suffix} para revelar")
}

/// The label under one counter cell, e.g. `anos` or `mes`.
pub const fn unit_label(unit: TimeUnit, value: u32) -> &'static str {
    let singular = value == 1;
    match unit {
        TimeUnit::Years => {
            if singular { "ano" } else { "anos" }
        }
        TimeUnit::Months => {
            if singular { "mes" } else { "meses" }
        }
        TimeUnit::Days => {
            if singular { "dia" } else { "dias" }
        }
        TimeUnit::Hours => {
            if singular { "hora" } else { "horas" }
        }
        TimeUnit::Minutes => {
            if singular { "minuto" } else { "minutos" }
        }
        TimeUnit::Seconds => {
            if singular { "segundo" } else { "segundos" }
        }
    }
}
