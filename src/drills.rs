use std::fmt::Write as _;

/// A practice drill with the steps a player follows on court.
#[derive(Debug)]
pub struct Drill {
    pub name: &'static str,
    pub category: &'static str,
    pub difficulty: &'static str,
    pub duration_mins: u32,
    pub description: &'static str,
    pub instructions: &'static [&'static str],
    pub focus: &'static [&'static str],
    pub benefits: &'static str,
}

pub static DRILLS: [Drill; 3] = [
    Drill {
        name: "Split-Step Footwork Drill",
        category: "footwork",
        difficulty: "beginner",
        duration_mins: 15,
        description: "Master the split-step for better court movement and reaction time",
        instructions: &[
            "Start in ready position at the baseline",
            "Have a partner or coach feed balls to different court positions",
            "Perform a small hop (split-step) as the ball is being hit",
            "Land with feet shoulder-width apart, knees slightly bent",
            "Push off explosively toward the ball's direction",
            "Focus on quick, light steps and maintaining balance",
            "Practice for 3 sets of 10 repetitions each",
        ],
        focus: &["Reaction time", "Balance", "Explosive movement", "Court positioning"],
        benefits: "Improves reaction time, court coverage, and overall movement efficiency",
    },
    Drill {
        name: "Ladder Agility Drill",
        category: "footwork",
        difficulty: "beginner",
        duration_mins: 20,
        description: "Enhance footwork speed and coordination with ladder drills",
        instructions: &[
            "Set up an agility ladder on the court",
            "Start with basic in-and-out pattern through each rung",
            "Keep feet light and quick, landing on balls of feet",
            "Progress to side-to-side movements",
            "Add tennis-specific movements like cross-steps",
            "Practice for 2 minutes, rest 1 minute, repeat 3 times",
        ],
        focus: &["Speed", "Coordination", "Agility", "Foot placement"],
        benefits: "Develops quick feet, better coordination, and tennis-specific movement patterns",
    },
    Drill {
        name: "Shadow Tennis Drill",
        category: "footwork",
        difficulty: "intermediate",
        duration_mins: 25,
        description: "Practice footwork patterns without a ball to improve muscle memory",
        instructions: &[
            "Start at the baseline in ready position",
            "Simulate receiving shots to different court positions",
            "Practice proper footwork for forehand, backhand, and volleys",
            "Focus on split-step timing and recovery steps",
            "Move as if playing a real point",
            "Practice for 5 minutes, focusing on smooth, efficient movement",
        ],
        focus: &["Muscle memory", "Movement patterns", "Timing", "Recovery"],
        benefits: "Builds muscle memory for proper footwork and improves movement efficiency",
    },
];

pub fn in_category(category: &str) -> Vec<&'static Drill> {
    DRILLS.iter().filter(|d| d.category == category).collect()
}

impl Drill {
    /// Numbered steps followed by focus areas, duration and benefits.
    pub fn instructions_block(&self) -> String {
        let mut out = String::from("**Step-by-Step Instructions:**\n");
        for (i, step) in self.instructions.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", i + 1, step);
        }
        let _ = write!(
            out,
            "\n**Focus Areas:** {}\n**Duration:** {} minutes\n**Benefits:** {}",
            self.focus.join(", "),
            self.duration_mins,
            self.benefits
        );
        out
    }
}
