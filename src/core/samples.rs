//! Built-in guide set used when the payload cannot be loaded.

use super::guide::{Category, Difficulty, Guide};

struct Sample {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    content: &'static str,
    category: Category,
    difficulty: Difficulty,
    time_estimate: &'static str,
    tools: &'static [&'static str],
    keywords: &'static [&'static str],
}

impl Sample {
    fn into_guide(self) -> Guide {
        Guide {
            id: self.id.to_string(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            content: self.content.to_string(),
            category: self.category,
            difficulty: self.difficulty,
            time_estimate: self.time_estimate.to_string(),
            tools: self.tools.iter().map(ToString::to_string).collect(),
            keywords: self.keywords.iter().map(ToString::to_string).collect(),
        }
    }
}

/// The fallback catalog: sixteen guides, at least one per known category.
#[must_use]
pub fn fallback_guides() -> Vec<Guide> {
    samples().into_iter().map(Sample::into_guide).collect()
}

#[allow(clippy::too_many_lines)]
fn samples() -> Vec<Sample> {
    use Category::{Bathroom, Bedroom, Emergency, Kitchen, LivingRoom, Office, Outdoor, Seasonal};
    use Difficulty::{Easy, Medium};

    vec![
        Sample {
            id: "kitchen-001",
            title: "Blocked Kitchen Drain",
            description: "Fix clogged kitchen sink drains using common household items",
            content: "Use baking soda and vinegar mixture, followed by hot water flush. Check garbage disposal if present.",
            category: Kitchen,
            difficulty: Easy,
            time_estimate: "15-30 minutes",
            tools: &["plunger", "baking soda", "vinegar"],
            keywords: &["drain", "clog", "sink", "water", "backup"],
        },
        Sample {
            id: "kitchen-002",
            title: "Leaky Faucet Repair",
            description: "Stop dripping faucets by replacing washers and O-rings",
            content: "Turn off water supply, disassemble faucet, replace worn washers and O-rings, reassemble.",
            category: Kitchen,
            difficulty: Medium,
            time_estimate: "30-60 minutes",
            tools: &["wrench", "screwdriver", "washers", "O-rings"],
            keywords: &["faucet", "leak", "drip", "water", "washer"],
        },
        Sample {
            id: "kitchen-003",
            title: "Garbage Disposal Issues",
            description: "Troubleshoot common garbage disposal problems",
            content: "Check for clogs, reset button, ensure proper electrical connection, clean thoroughly.",
            category: Kitchen,
            difficulty: Medium,
            time_estimate: "20-45 minutes",
            tools: &["flashlight", "tongs", "hex key"],
            keywords: &["disposal", "garbage", "jam", "clog", "motor"],
        },
        Sample {
            id: "bathroom-001",
            title: "Toilet Running Constantly",
            description: "Fix toilets that won't stop running water",
            content: "Check flapper seal, adjust chain length, replace flapper if warped, adjust water level.",
            category: Bathroom,
            difficulty: Easy,
            time_estimate: "10-20 minutes",
            tools: &["none required"],
            keywords: &["toilet", "running", "flapper", "chain", "water"],
        },
        Sample {
            id: "bathroom-002",
            title: "Shower Low Water Pressure",
            description: "Improve weak shower water flow",
            content: "Clean showerhead, check for mineral buildup, replace if necessary, check water pressure.",
            category: Bathroom,
            difficulty: Easy,
            time_estimate: "15-30 minutes",
            tools: &["vinegar", "plastic bag", "rubber band"],
            keywords: &["shower", "pressure", "flow", "showerhead", "water"],
        },
        Sample {
            id: "bathroom-003",
            title: "Caulk Replacement",
            description: "Re-caulk bathroom fixtures to prevent water damage",
            content: "Remove old caulk, clean surface, apply new caulk in continuous bead, smooth with finger.",
            category: Bathroom,
            difficulty: Medium,
            time_estimate: "45-90 minutes",
            tools: &["caulk gun", "silicone caulk", "scraper", "cleaning supplies"],
            keywords: &["caulk", "seal", "water", "damage", "mold"],
        },
        Sample {
            id: "living-room-001",
            title: "Squeaky Floor Repair",
            description: "Eliminate annoying floor squeaks and creaks",
            content: "Locate squeak source, secure loose subfloor, add screws to joists, use graphite for minor squeaks.",
            category: LivingRoom,
            difficulty: Medium,
            time_estimate: "30-60 minutes",
            tools: &["drill", "screws", "stud finder", "graphite"],
            keywords: &["floor", "squeak", "creak", "noise", "subfloor"],
        },
        Sample {
            id: "living-room-002",
            title: "Thermostat Problems",
            description: "Troubleshoot heating and cooling control issues",
            content: "Check batteries, verify wiring connections, calibrate temperature, replace if faulty.",
            category: LivingRoom,
            difficulty: Medium,
            time_estimate: "20-40 minutes",
            tools: &["screwdriver", "multimeter", "batteries"],
            keywords: &["thermostat", "heating", "cooling", "temperature", "HVAC"],
        },
        Sample {
            id: "bedroom-001",
            title: "Electrical Outlet Not Working",
            description: "Fix dead electrical outlets safely",
            content: "Check circuit breaker, test GFCI reset, inspect wiring connections, replace outlet if needed.",
            category: Bedroom,
            difficulty: Medium,
            time_estimate: "30-45 minutes",
            tools: &["voltage tester", "screwdriver", "wire nuts"],
            keywords: &["outlet", "electrical", "power", "breaker", "GFCI"],
        },
        Sample {
            id: "bedroom-002",
            title: "Window Won't Open or Close",
            description: "Repair stuck or difficult windows",
            content: "Clean tracks, lubricate hinges, adjust sash balance, repair broken cords.",
            category: Bedroom,
            difficulty: Medium,
            time_estimate: "45-90 minutes",
            tools: &["lubricant", "screwdriver", "putty knife"],
            keywords: &["window", "stuck", "sash", "balance", "tracks"],
        },
        Sample {
            id: "office-001",
            title: "Flickering Desk Lighting",
            description: "Stop office lights from flickering or buzzing",
            content: "Tighten the bulb, replace worn bulbs, check the dimmer switch rating, inspect the fixture socket.",
            category: Office,
            difficulty: Easy,
            time_estimate: "10-25 minutes",
            tools: &["replacement bulb", "voltage tester", "screwdriver"],
            keywords: &["light", "flicker", "bulb", "dimmer", "fixture"],
        },
        Sample {
            id: "outdoor-001",
            title: "Gutter Cleaning and Repair",
            description: "Maintain proper water drainage from roof",
            content: "Remove debris, check for leaks, ensure proper slope, secure loose brackets.",
            category: Outdoor,
            difficulty: Medium,
            time_estimate: "2-4 hours",
            tools: &["ladder", "gloves", "trowel", "hose"],
            keywords: &["gutter", "roof", "drainage", "water", "debris"],
        },
        Sample {
            id: "outdoor-002",
            title: "Sprinkler System Issues",
            description: "Fix common irrigation problems",
            content: "Check water pressure, clean clogged heads, adjust spray patterns, repair broken lines.",
            category: Outdoor,
            difficulty: Medium,
            time_estimate: "1-3 hours",
            tools: &["shovel", "PVC fittings", "pipe cutter"],
            keywords: &["sprinkler", "irrigation", "water", "pressure", "landscape"],
        },
        Sample {
            id: "emergency-001",
            title: "Water Main Shut-off",
            description: "Emergency water supply shutdown procedures",
            content: "Locate main water valve, turn clockwise to close, notify utility company if needed.",
            category: Emergency,
            difficulty: Easy,
            time_estimate: "5-10 minutes",
            tools: &["water meter key", "flashlight"],
            keywords: &["water", "emergency", "shutoff", "main", "valve"],
        },
        Sample {
            id: "emergency-002",
            title: "Circuit Breaker Tripped",
            description: "Safely reset electrical circuit breakers",
            content: "Identify tripped breaker, turn fully off then on, investigate cause of trip.",
            category: Emergency,
            difficulty: Easy,
            time_estimate: "5-15 minutes",
            tools: &["flashlight"],
            keywords: &["breaker", "electrical", "power", "trip", "reset"],
        },
        Sample {
            id: "seasonal-001",
            title: "Winterize Outdoor Faucets",
            description: "Protect hose bibs and exterior pipes before the first freeze",
            content: "Disconnect hoses, shut the interior valve, drain the line, fit insulated faucet covers.",
            category: Seasonal,
            difficulty: Easy,
            time_estimate: "20-40 minutes",
            tools: &["faucet cover", "bucket", "adjustable wrench"],
            keywords: &["winter", "freeze", "pipes", "seasonal", "hose"],
        },
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn fallback_has_sixteen_unique_guides() {
        let guides = fallback_guides();
        assert_eq!(guides.len(), 16);
        let ids: HashSet<_> = guides.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids.len(), 16);
    }

    #[test]
    fn fallback_spans_every_known_category() {
        let guides = fallback_guides();
        for category in Category::KNOWN {
            assert!(
                guides.iter().any(|g| g.category == category),
                "no fallback guide for {category}"
            );
        }
    }
}
