//! Texas Driving While Intoxicated (Penal Code ch. 49).

use super::{
    strings, CaseTypeKnowledge, Defense, DefenseStrength, FactCategory, FactDefinition,
    OffenseLevel, Priority,
};

/// Built-in knowledge for Texas DWI matters.
pub fn texas_dwi() -> CaseTypeKnowledge {
    use FactCategory::{Classification, Context, Defense as Def, Procedural, Severity};
    use Priority::{Critical, Helpful, Important};

    let facts = vec![
        FactDefinition::new("arrest_date", "When were you arrested?", Critical, Procedural),
        FactDefinition::new(
            "prior_dwi_convictions",
            "Have you ever been convicted of a DWI before? If so, how many times?",
            Critical,
            Classification,
        ),
        FactDefinition::new(
            "chemical_test",
            "Did you take a breath or blood test, or did you refuse?",
            Critical,
            Classification,
        )
        .with_options(&["breath", "blood", "refused", "none"]),
        FactDefinition::new(
            "bac_result",
            "Do you know what your breath test result was?",
            Critical,
            Severity,
        )
        .when("chemical_test", "breath"),
        FactDefinition::new(
            "reason_for_stop",
            "What reason did the officer give for pulling you over?",
            Critical,
            Def,
        ),
        FactDefinition::new(
            "accident_involved",
            "Was there an accident?",
            Critical,
            Severity,
        )
        .with_options(&["yes", "no"]),
        FactDefinition::new(
            "injuries",
            "Was anyone hurt in the accident?",
            Critical,
            Severity,
        )
        .when("accident_involved", "yes"),
        FactDefinition::new(
            "arrest_county",
            "Which county were you arrested in?",
            Important,
            Procedural,
        ),
        FactDefinition::new(
            "field_sobriety_tests",
            "Did the officer have you do any roadside tests, like walking a line or following a light?",
            Important,
            Def,
        )
        .with_options(&["yes", "no"]),
        FactDefinition::new(
            "child_passenger",
            "Was anyone under 15 in the car with you?",
            Important,
            Severity,
        )
        .with_options(&["yes", "no"]),
        FactDefinition::new(
            "commercial_license",
            "Do you have a commercial driver's license?",
            Important,
            Context,
        )
        .with_options(&["yes", "no"]),
        FactDefinition::new(
            "alr_hearing_requested",
            "Have you requested the license (ALR) hearing yet? There's a 15-day deadline from the arrest.",
            Important,
            Procedural,
        )
        .with_options(&["yes", "no", "unsure"]),
        FactDefinition::new(
            "blood_warrant",
            "Did they get a warrant for the blood draw, or did you agree to it?",
            Important,
            Def,
        )
        .when("chemical_test", "blood"),
        FactDefinition::new(
            "drinking_timeline",
            "Roughly how much had you had to drink, and over what time?",
            Helpful,
            Def,
        ),
        FactDefinition::new(
            "video_evidence",
            "Do you know if there was dashcam or bodycam video?",
            Helpful,
            Def,
        ),
        FactDefinition::new(
            "medical_conditions",
            "Any medical conditions or medications that could affect balance or breath results?",
            Helpful,
            Def,
        ),
        FactDefinition::new(
            "employment_impact",
            "Would a conviction or license suspension affect your job?",
            Helpful,
            Context,
        ),
    ];

    let offense_levels = vec![
        OffenseLevel::new(
            "DWI - First Offense",
            "Class B Misdemeanor",
            "72 hours to 180 days",
            "Up to $3,000",
        )
        .license("Suspension of 90 days to 1 year"),
        OffenseLevel::new(
            "DWI - First Offense, BAC 0.15+",
            "Class A Misdemeanor",
            "Up to 1 year",
            "Up to $4,000",
        )
        .license("Suspension of 90 days to 1 year")
        .when("BAC of 0.15 or higher at time of analysis"),
        OffenseLevel::new(
            "DWI - Second Offense",
            "Class A Misdemeanor",
            "30 days to 1 year",
            "Up to $4,000",
        )
        .license("Suspension of 180 days to 2 years")
        .when("One prior DWI conviction"),
        OffenseLevel::new(
            "DWI - Third or Subsequent",
            "Third Degree Felony",
            "2 to 10 years",
            "Up to $10,000",
        )
        .license("Suspension of 180 days to 2 years")
        .when("Two or more prior DWI convictions"),
        OffenseLevel::new(
            "DWI with Child Passenger",
            "State Jail Felony",
            "180 days to 2 years",
            "Up to $10,000",
        )
        .when("Passenger younger than 15"),
        OffenseLevel::new(
            "Intoxication Assault",
            "Third Degree Felony",
            "2 to 10 years",
            "Up to $10,000",
        )
        .when("Accident causing serious bodily injury"),
        OffenseLevel::new(
            "Intoxication Manslaughter",
            "Second Degree Felony",
            "2 to 20 years",
            "Up to $10,000",
        )
        .when("Accident causing death"),
    ];

    let defenses = vec![
        Defense::new(
            "No reasonable suspicion for the stop",
            "If the officer lacked a lawful basis to stop the vehicle, evidence from the stop can be suppressed.",
            DefenseStrength::Strong,
            &["reason_for_stop"],
        ),
        Defense::new(
            "Improperly administered field sobriety tests",
            "Standardized field sobriety tests given off-protocol or on bad surfaces carry little weight.",
            DefenseStrength::Moderate,
            &["field_sobriety_tests", "video_evidence"],
        ),
        Defense::new(
            "Breath test reliability",
            "Maintenance records, observation period and operator certification for the breath instrument can be challenged.",
            DefenseStrength::Moderate,
            &["chemical_test", "bac_result"],
        ),
        Defense::new(
            "Warrantless blood draw",
            "A blood draw without a warrant or valid consent may be suppressed.",
            DefenseStrength::Strong,
            &["chemical_test", "blood_warrant"],
        ),
        Defense::new(
            "Rising blood alcohol",
            "Recent drinking can mean BAC at the time of driving was below the test result.",
            DefenseStrength::Moderate,
            &["drinking_timeline", "bac_result"],
        ),
        Defense::new(
            "Medical explanation for impairment signs",
            "Conditions such as GERD, diabetes or injuries can mimic intoxication cues.",
            DefenseStrength::Weak,
            &["medical_conditions"],
        ),
    ];

    CaseTypeKnowledge {
        case_type: "dwi".to_owned(),
        display_name: "Driving While Intoxicated (DWI)".to_owned(),
        jurisdiction: "Texas".to_owned(),
        description: "Operating a motor vehicle in a public place while intoxicated, including \
                      enhanced and injury-related offenses."
            .to_owned(),
        statutes: strings(&[
            "Texas Penal Code § 49.04 (Driving While Intoxicated)",
            "Texas Penal Code § 49.045 (DWI with Child Passenger)",
            "Texas Penal Code § 49.07 (Intoxication Assault)",
            "Texas Penal Code § 49.08 (Intoxication Manslaughter)",
            "Texas Penal Code § 49.09 (Enhanced Offenses and Penalties)",
            "Texas Transportation Code ch. 524 (Administrative License Revocation)",
        ]),
        facts,
        offense_levels,
        defenses,
        take_signals: strings(&[
            "First offense with no accident and no injuries",
            "Questionable or unexplained reason for the traffic stop",
            "Breath test refused or no chemical test taken",
            "BAC result near the 0.08 limit",
            "Blood drawn without a warrant",
            "Video exists that may contradict the officer's report",
            "ALR hearing deadline has not passed",
        ]),
        pass_signals: strings(&[
            "Arrest occurred outside Texas",
            "Caller already has an attorney on this case",
            "Case already resolved by plea or conviction with appeal deadlines passed",
        ]),
        review_signals: strings(&[
            "Accident involving injuries or death",
            "Child passenger under 15",
            "Two or more prior DWI convictions",
            "Commercial driver's license holder",
            "BAC of 0.15 or higher",
            "ALR hearing deadline may have passed",
        ]),
        keywords: strings(&[
            "DWI",
            "DUI",
            "drunk driving",
            "intoxicated",
            "breathalyzer",
            "breath test",
            "blood test",
            "field sobriety",
            "pulled over after drinking",
            "arrested for drinking",
        ]),
    }
}
