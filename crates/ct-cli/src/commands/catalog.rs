//! Catalog command: known drinks and milk options.

use std::fmt::Write;

use ct_core::{CoffeeCatalog, MilkTable};

use crate::Config;

/// Runs the catalog command with the configured drinks and milk options.
pub fn run(config: &Config) {
    print!("{}", format_catalog(&config.catalog, &config.milk));
}

/// Formats the drink catalog and milk table.
pub fn format_catalog(catalog: &CoffeeCatalog, milk: &MilkTable) -> String {
    let mut output = String::new();

    writeln!(output, "DRINKS").unwrap();
    writeln!(output, "{:<18}  {:>7}  {:>9}", "Name", "Volume", "Caffeine").unwrap();
    writeln!(output, "──────────────────  ───────  ─────────").unwrap();
    for drink in catalog.iter() {
        writeln!(
            output,
            "{:<18}  {:>7}  {:>9}",
            drink.name,
            format!("{} ml", drink.volume_ml),
            format!("{} mg", drink.caffeine_mg)
        )
        .unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "MILK").unwrap();
    writeln!(
        output,
        "{:<12}  {:>9}  {:>10}",
        "Name", "Reduction", "Peak delay"
    )
    .unwrap();
    writeln!(output, "────────────  ─────────  ──────────").unwrap();
    for modifier in milk.iter() {
        writeln!(
            output,
            "{:<12}  {:>9}  {:>10}",
            modifier.name,
            format!("{:.0}%", modifier.caffeine_reduction * 100.0),
            format!("+{} min", modifier.peak_delay_minutes)
        )
        .unwrap();
    }

    output
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    #[test]
    fn standard_catalog_snapshot() {
        let output = format_catalog(&CoffeeCatalog::standard(), &MilkTable::standard());
        assert_snapshot!(output, @r"
        DRINKS
        Name                 Volume   Caffeine
        ──────────────────  ───────  ─────────
        Espresso              30 ml      75 mg
        Double Espresso       60 ml     150 mg
        Americano            240 ml     150 mg
        Flat White           160 ml     130 mg
        Latte                240 ml      75 mg
        Cappuccino           180 ml      75 mg
        Macchiato             40 ml      75 mg
        Mocha                240 ml      95 mg
        Cold Brew            350 ml     200 mg
        Drip Coffee          240 ml      95 mg

        MILK
        Name          Reduction  Peak delay
        ────────────  ─────────  ──────────
        No Milk              0%      +0 min
        Whole Milk          12%     +20 min
        Skim Milk            8%     +15 min
        Oat Milk            10%     +18 min
        Almond Milk          6%     +12 min
        Soy Milk             9%     +15 min
        Heavy Cream         15%     +25 min
        ");
    }
}
