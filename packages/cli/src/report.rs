//! Plain-text summaries printed to stdout.

use venue_profile::{Derivation, RadiusOrigin, SearchArea, VenueProfile};
use venue_profile_stats::describe::PriceSummary;
use venue_profile_tract_models::{ResolvedAddress, SearchRadius, TractLocation};

pub fn print_derivation(resolved: &ResolvedAddress, derivation: &Derivation, radius: SearchRadius) {
    if let Some(matched) = &resolved.matched_address {
        println!("Matched:        {matched}");
    }
    println!("Coordinates:    {}", resolved.coordinates.lat_lng());
    print_derivation_details(derivation);
    println!("Search radius:  {:.1} m", radius.meters());
}

pub fn print_search_area(area: &SearchArea) {
    if let Some(matched) = &area.matched_address {
        println!("Matched:        {matched}");
    }
    println!("Coordinates:    {}", area.center.lat_lng());
    if let Some(derivation) = &area.derivation {
        print_derivation_details(derivation);
    } else if let Some(tract) = &area.tract {
        print_tract(tract);
    }
    println!("Search radius:  {:.1} m ({})", area.radius.meters(), origin_label(&area.origin));
}

fn print_tract(tract: &TractLocation) {
    println!("Tract:          {}", tract.geoid());
    println!("Population:     {}", tract.population);
    println!("Land area:      {:.0} m²", tract.land_area);
}

fn print_derivation_details(derivation: &Derivation) {
    print_tract(&derivation.tract);
    println!("Households:     {}", derivation.counts.households());
    println!("Average income: ${:.2}", derivation.average_income.dollars());
}

fn origin_label(origin: &RadiusOrigin) -> String {
    match origin {
        RadiusOrigin::Derived => "derived".to_string(),
        RadiusOrigin::ZeroPopulation { geoid } => format!("fixed, tract {geoid} has no residents"),
        RadiusOrigin::GeocoderFallback { reason } => format!("fixed, geocoder fallback: {reason}"),
    }
}

pub fn print_profile(profile: &VenueProfile) {
    println!("Address:        {}", profile.address);
    print_search_area(&profile.search_area);
    println!();

    let tables = &profile.tables;
    println!("Venues:         {}", tables.venues.len());
    println!("Menus:          {}", profile.raw.menus.len());
    println!("Menu items:     {}", tables.menu_items.len());

    if !profile.skipped_menus.is_empty() {
        println!("Skipped menus:  {}", profile.skipped_menus.len());
        for skipped in &profile.skipped_menus {
            println!("  {} ({}): {}", skipped.venue_name, skipped.venue_id, skipped.reason);
        }
    }

    let Some(stats) = &tables.statistics else {
        println!();
        println!("No complete menu items for statistics.");
        return;
    };

    println!();
    println!("{:<32} {}", "All items", summary_line(&stats.overall));
    for menu in &stats.by_menu {
        println!("{:<32} {}", truncate(&menu.menu_name, 32), summary_line(&menu.summary));
    }

    println!();
    let Some(bayes) = &stats.bayes_mvs else {
        println!("Bayesian estimates need at least four prices that are not all equal.");
        return;
    };
    println!("Bayesian estimates ({:.0}% credible intervals)", bayes.alpha * 100.0);
    for (label, estimate) in [
        ("mean", &bayes.mean),
        ("variance", &bayes.variance),
        ("std", &bayes.std),
    ] {
        println!(
            "  {label:<9} {:>10.2}  [{:.2}, {:.2}]",
            estimate.center, estimate.lower, estimate.upper
        );
    }
}

fn summary_line(summary: &PriceSummary) -> String {
    let std = summary
        .std
        .map_or_else(|| "-".to_string(), |std| format!("{std:.2}"));
    format!(
        "n={:<4} mean={:>7.2} std={:>7} min={:>6.2} median={:>6.2} max={:>7.2}",
        summary.count, summary.mean, std, summary.min, summary.p50, summary.max
    )
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(width - 1).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_names() {
        assert_eq!(truncate("Brunch", 32), "Brunch");
        assert_eq!(truncate("abcdef", 4), "abc…");
    }

    #[test]
    fn origin_labels() {
        assert_eq!(origin_label(&RadiusOrigin::Derived), "derived");
        assert_eq!(
            origin_label(&RadiusOrigin::ZeroPopulation {
                geoid: "11001000100".to_string()
            }),
            "fixed, tract 11001000100 has no residents"
        );
    }
}
