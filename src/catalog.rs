//! Reference catalogs of accepted dietary restriction and accessibility labels

/// Dietary restriction labels a profile may carry
pub const DIETARY_RESTRICTIONS: [&str; 30] = [
    "None",
    "Halal",
    "Kosher",
    "Vegan",
    "Vegetarian",
    "Nut allergy",
    "Gluten-free",
    "Dairy-free",
    "Lactose intolerant",
    "Shellfish allergy",
    "Soy allergy",
    "Egg allergy",
    "Seafood allergy",
    "Low-sodium",
    "Low-carb",
    "Low-fat",
    "Diabetic",
    "No pork",
    "Pescatarian",
    "Paleo",
    "Keto",
    "FODMAP",
    "Organic only",
    "Peanut allergy",
    "Citrus allergy",
    "Sulfite allergy",
    "Fructose intolerance",
    "MSG sensitivity",
    "Raw food diet",
    "Nightshade allergy",
];

/// Accessibility labels a profile may carry
pub const ACCESSIBILITIES: [&str; 21] = [
    "None",
    "Wheelchair user",
    "Visual impairment",
    "Hearing impairment",
    "Cognitive disability",
    "Autism",
    "Dyslexia",
    "ADHD",
    "Mobility impairment",
    "Chronic pain",
    "Mental health condition",
    "Speech impairment",
    "Chronic illness",
    "Epilepsy",
    "Alzheimer's disease",
    "Parkinson's disease",
    "Down syndrome",
    "Spinal cord injury",
    "Cerebral palsy",
    "Muscular dystrophy",
    "Multiple sclerosis",
];

/// Exact, case-sensitive membership in the dietary catalog
#[must_use]
pub fn is_valid_dietary(label: &str) -> bool {
    DIETARY_RESTRICTIONS.contains(&label)
}

/// Exact, case-sensitive membership in the accessibility catalog
#[must_use]
pub fn is_valid_accessibility(label: &str) -> bool {
    ACCESSIBILITIES.contains(&label)
}
