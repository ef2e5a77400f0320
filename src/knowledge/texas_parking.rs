//! Texas parking citations (municipal and Transportation Code).

use super::{
    strings, CaseTypeKnowledge, Defense, DefenseStrength, FactCategory, FactDefinition,
    OffenseLevel, Priority,
};

/// Built-in knowledge for Texas parking tickets.
pub fn texas_parking() -> CaseTypeKnowledge {
    use FactCategory::{Classification, Context, Defense as Def, Procedural, Severity};
    use Priority::{Critical, Helpful, Important};

    let facts = vec![
        FactDefinition::new(
            "violation_type",
            "What was the ticket for, like an expired meter, a no-parking zone, a disabled spot or a fire lane?",
            Critical,
            Classification,
        )
        .with_options(&["expired_meter", "no_parking_zone", "disabled_parking", "fire_lane", "other"]),
        FactDefinition::new("citation_date", "When did you get the ticket?", Critical, Procedural),
        FactDefinition::new(
            "citation_city",
            "Which city issued the ticket?",
            Critical,
            Procedural,
        ),
        FactDefinition::new(
            "fine_amount",
            "How much is the fine on the ticket?",
            Critical,
            Severity,
        ),
        FactDefinition::new(
            "placard_displayed",
            "Did you have a valid disabled placard or plate displayed?",
            Critical,
            Def,
        )
        .when("violation_type", "disabled_parking"),
        FactDefinition::new(
            "signage_visible",
            "Were there clear signs where you parked?",
            Important,
            Def,
        )
        .with_options(&["yes", "no", "unsure"]),
        FactDefinition::new(
            "due_date",
            "When is the ticket due or your court date?",
            Important,
            Procedural,
        ),
        FactDefinition::new(
            "registered_owner",
            "Is the car registered in your name?",
            Important,
            Context,
        )
        .with_options(&["yes", "no"]),
        FactDefinition::new(
            "meter_working",
            "Was the meter working when you parked?",
            Important,
            Def,
        )
        .when("violation_type", "expired_meter"),
        FactDefinition::new(
            "vehicle_towed",
            "Was your car towed or booted?",
            Important,
            Severity,
        )
        .with_options(&["yes", "no"]),
        FactDefinition::new(
            "has_photos",
            "Do you have any photos of where you parked or the signs?",
            Helpful,
            Def,
        ),
        FactDefinition::new(
            "unpaid_tickets",
            "Do you have any other unpaid tickets?",
            Helpful,
            Severity,
        ),
    ];

    let offense_levels = vec![
        OffenseLevel::new(
            "Standard Parking Violation",
            "Civil Municipal Citation",
            "None",
            "$20 to $250 depending on city",
        ),
        OffenseLevel::new(
            "Fire Lane Violation",
            "Class C Misdemeanor",
            "None",
            "Up to $500",
        )
        .when("Parked in a marked fire lane"),
        OffenseLevel::new(
            "Disabled Parking Violation",
            "Misdemeanor (Transportation Code § 681.011)",
            "None",
            "$500 to $750 first offense, up to $1,250 for repeat offenses",
        )
        .when("Parked in a disabled space without a valid placard or plate"),
        OffenseLevel::new(
            "Failure to Pay or Appear",
            "Class C Misdemeanor",
            "None (warrant possible)",
            "Up to $500 plus late fees",
        )
        .license("Possible registration renewal block")
        .when("Citation not paid or contested by the due date"),
    ];

    let defenses = vec![
        Defense::new(
            "Missing or inadequate signage",
            "Restrictions must be clearly posted; obscured or missing signs defeat the citation.",
            DefenseStrength::Strong,
            &["signage_visible", "has_photos"],
        ),
        Defense::new(
            "Valid disabled placard",
            "A valid placard or plate displayed at the time is a complete defense.",
            DefenseStrength::Strong,
            &["placard_displayed"],
        ),
        Defense::new(
            "Malfunctioning meter",
            "Many cities excuse meter violations when the meter was broken.",
            DefenseStrength::Moderate,
            &["meter_working"],
        ),
        Defense::new(
            "Not the registered owner",
            "Owner-liability citations fail if the vehicle was sold or not owned by the caller.",
            DefenseStrength::Moderate,
            &["registered_owner"],
        ),
        Defense::new(
            "Defective citation",
            "Wrong plate, location or date on the citation can support dismissal.",
            DefenseStrength::Weak,
            &["has_photos"],
        ),
    ];

    CaseTypeKnowledge {
        case_type: "parking_ticket".to_owned(),
        display_name: "Parking Citation".to_owned(),
        jurisdiction: "Texas".to_owned(),
        description: "Municipal parking citations, including disabled-parking and fire lane \
                      violations."
            .to_owned(),
        statutes: strings(&[
            "Texas Transportation Code § 545.302 (Stopping, Standing, or Parking Prohibited)",
            "Texas Transportation Code § 681.011 (Disabled Parking Offenses)",
            "Texas Transportation Code § 682 (Administrative Adjudication of Parking Violations)",
        ]),
        facts,
        offense_levels,
        defenses,
        take_signals: strings(&[
            "Disabled parking citation with a valid placard",
            "Fine of $500 or more",
            "Several citations that could be handled together",
            "Photos showing missing or obscured signs",
        ]),
        pass_signals: strings(&[
            "Single low-dollar ticket where the fine is less than the consultation cost",
            "Ticket already paid",
            "Citation issued outside Texas",
        ]),
        review_signals: strings(&[
            "Outstanding warrant for failure to pay or appear",
            "Vehicle towed or impounded",
            "Commercial or fleet vehicle",
        ]),
        keywords: strings(&[
            "parking ticket",
            "parking citation",
            "parking meter",
            "towed",
            "booted",
            "handicap spot",
            "disabled parking",
            "fire lane",
            "no parking",
        ]),
    }
}
