use chrono::{NaiveTime, Timelike};
use rand::Rng;
use rand::seq::IndexedRandom;
use std::fmt;
use std::str::FromStr;

use crate::catalog::CatalogRecord;
use crate::error::BlogError;

pub const DEFAULT_TITLE: &str = "Complete Tennis Guide: Equipment, Training, and Tips";

/// Title choices for the daily post; `{name}` is the highlighted racket.
pub static DAILY_TITLES: [&str; 5] = [
    "Master Your Tennis Game: {name} Review and Essential Footwork Drills",
    "Tennis Improvement Guide: {name} Analysis and Proven Training Methods",
    "From Beginner to Advanced: {name} and the Path to Tennis Excellence",
    "Tennis Equipment and Training: {name} Review with Expert Drills",
    "Complete Tennis Guide: {name} Review, Drills, and Success Stories",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Theme {
    TopSpinRackets,
    TopControlRackets,
    TopPowerRackets,
    TopBeginnerRackets,
    ImproveUtrFast,
    RacketReview,
    TechniqueGuide,
    EquipmentComparison,
    PlayerSuccessStory,
    TrainingTips,
    /// Gear highlight, drill, player story and bonus in one post. Only
    /// generated on request, never picked at random.
    DailyPost,
    /// Any id outside the registered set. Rendered as a generic topic post.
    Other(String),
}

/// Guide section baked into a strategy theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub title: &'static str,
    pub description: &'static str,
}

pub type RecordFilter = fn(&CatalogRecord) -> bool;

#[derive(Debug, Clone, Copy)]
pub enum Strategy {
    /// Top-N list; `None` means a random sample of the catalog.
    TopList(Option<RecordFilter>),
    Review,
    Guide {
        heading: &'static str,
        blocks: &'static [Block],
    },
    SuccessStory,
    Daily,
}

impl Theme {
    pub const REGISTERED: [Theme; 10] = [
        Theme::TopSpinRackets,
        Theme::TopControlRackets,
        Theme::TopPowerRackets,
        Theme::TopBeginnerRackets,
        Theme::ImproveUtrFast,
        Theme::RacketReview,
        Theme::TechniqueGuide,
        Theme::EquipmentComparison,
        Theme::PlayerSuccessStory,
        Theme::TrainingTips,
    ];

    pub fn id(&self) -> &str {
        match self {
            Theme::TopSpinRackets => "top_10_spin_rackets",
            Theme::TopControlRackets => "top_10_control_rackets",
            Theme::TopPowerRackets => "top_10_power_rackets",
            Theme::TopBeginnerRackets => "top_10_beginner_rackets",
            Theme::ImproveUtrFast => "improve_utr_fast",
            Theme::RacketReview => "individual_racket_review",
            Theme::TechniqueGuide => "tennis_technique_guide",
            Theme::EquipmentComparison => "equipment_comparison",
            Theme::PlayerSuccessStory => "player_success_story",
            Theme::TrainingTips => "tennis_training_tips",
            Theme::DailyPost => "daily_tennis_post",
            Theme::Other(id) => id,
        }
    }

    /// Title for the post. `{name}` is replaced with the reviewed racket.
    pub fn title_template(&self) -> &'static str {
        match self {
            Theme::TopSpinRackets => "Top 10 Tennis Rackets for Spin Players in 2024: Ultimate Guide",
            Theme::TopControlRackets => "Top 10 Control Tennis Rackets for Precision Players",
            Theme::TopPowerRackets => "Top 10 Power Tennis Rackets for Aggressive Players",
            Theme::TopBeginnerRackets => "Top 10 Best Tennis Rackets for Beginners and Intermediate Players",
            Theme::ImproveUtrFast => "How to Improve Your UTR Rating Fast: 5 Proven Strategies",
            Theme::RacketReview => "Complete Review: {name} Tennis Racket",
            Theme::TechniqueGuide => "Essential Tennis Techniques Every Player Should Master",
            Theme::EquipmentComparison => "Tennis Equipment Comparison: Finding Your Perfect Match",
            Theme::PlayerSuccessStory => "Inspiring Tennis Success Stories: From Beginner to Advanced",
            Theme::TrainingTips => "Pro Tennis Training Tips: Improve Your Game Today",
            Theme::DailyPost => DAILY_TITLES[4],
            Theme::Other(_) => DEFAULT_TITLE,
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            Theme::ImproveUtrFast | Theme::TrainingTips | Theme::DailyPost => "training",
            Theme::TechniqueGuide => "technique",
            Theme::PlayerSuccessStory => "inspiration",
            _ => "equipment",
        }
    }

    pub fn tags(&self) -> &'static [&'static str] {
        match self {
            Theme::TopSpinRackets => &["tennis rackets", "spin", "top 10", "equipment"],
            Theme::TopControlRackets => &["tennis rackets", "control", "precision", "top 10"],
            Theme::TopPowerRackets => &["tennis rackets", "power", "aggressive", "top 10"],
            Theme::TopBeginnerRackets => &["tennis rackets", "beginner", "intermediate", "top 10"],
            Theme::ImproveUtrFast => &["UTR", "improvement", "training", "strategy"],
            Theme::RacketReview => &["tennis racket", "review", "equipment", "analysis"],
            Theme::TechniqueGuide => &["technique", "fundamentals", "training", "tips"],
            Theme::EquipmentComparison => &["equipment", "comparison", "tennis gear", "review"],
            Theme::PlayerSuccessStory => &["success story", "inspiration", "tennis journey", "motivation"],
            Theme::TrainingTips => &["training", "tips", "improvement", "practice"],
            Theme::DailyPost => &["racket review", "footwork drills", "success story", "daily"],
            Theme::Other(_) => &["tennis", "tips", "guide"],
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            Theme::TopSpinRackets => Strategy::TopList(Some(|r: &CatalogRecord| {
                contains(&r.best_for, "spin") || contains(&r.racket_type, "power")
            })),
            Theme::TopControlRackets => Strategy::TopList(Some(|r: &CatalogRecord| {
                contains(&r.racket_type, "control") || contains(&r.best_for, "precision")
            })),
            Theme::TopPowerRackets => Strategy::TopList(Some(|r: &CatalogRecord| contains(&r.racket_type, "power"))),
            Theme::TopBeginnerRackets => Strategy::TopList(Some(|r: &CatalogRecord| contains(&r.skill_level, "intermediate"))),
            Theme::Other(id) if id.starts_with("top_10") => Strategy::TopList(None),
            Theme::RacketReview => Strategy::Review,
            Theme::PlayerSuccessStory => Strategy::SuccessStory,
            Theme::DailyPost => Strategy::Daily,
            Theme::ImproveUtrFast => Strategy::Guide {
                heading: "5 Key Strategies to Improve Your UTR Fast",
                blocks: UTR_STRATEGIES,
            },
            Theme::TechniqueGuide => Strategy::Guide {
                heading: "Core Techniques to Practice This Week",
                blocks: TECHNIQUE_BLOCKS,
            },
            Theme::EquipmentComparison => Strategy::Guide {
                heading: "What to Compare Before You Buy",
                blocks: COMPARISON_BLOCKS,
            },
            Theme::TrainingTips => Strategy::Guide {
                heading: "Training Habits That Pay Off",
                blocks: TRAINING_BLOCKS,
            },
            Theme::Other(_) => Strategy::Guide {
                heading: "Fundamentals to Keep in Mind",
                blocks: FUNDAMENTAL_BLOCKS,
            },
        }
    }

    /// Human readable topic, used in prompts.
    pub fn topic(&self) -> String {
        self.id().replace('_', " ")
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl From<&str> for Theme {
    fn from(id: &str) -> Self {
        let id = id.trim();
        Theme::REGISTERED
            .into_iter()
            .chain([Theme::DailyPost])
            .find(|t| t.id() == id)
            .unwrap_or_else(|| Theme::Other(id.to_string()))
    }
}

/// Resolves a theme id; no id picks one of the registered themes at random.
/// Unknown ids resolve to [`Theme::Other`] rather than failing.
pub fn resolve<R: Rng + ?Sized>(theme_id: Option<&str>, rng: &mut R) -> Theme {
    match theme_id {
        Some(id) => Theme::from(id),
        None => Theme::REGISTERED
            .choose(rng)
            .cloned()
            .unwrap_or(Theme::Other(String::new())),
    }
}

fn contains(field: &str, needle: &str) -> bool {
    field.to_lowercase().contains(needle)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Morning,
    Afternoon,
    Evening,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Morning, Bucket::Afternoon, Bucket::Evening];

    pub fn name(&self) -> &'static str {
        match self {
            Bucket::Morning => "morning",
            Bucket::Afternoon => "afternoon",
            Bucket::Evening => "evening",
        }
    }

    pub fn themes(&self) -> [Theme; 4] {
        match self {
            Bucket::Morning => [
                Theme::TopSpinRackets,
                Theme::TopControlRackets,
                Theme::TopPowerRackets,
                Theme::TechniqueGuide,
            ],
            Bucket::Afternoon => [
                Theme::RacketReview,
                Theme::ImproveUtrFast,
                Theme::EquipmentComparison,
                Theme::TopBeginnerRackets,
            ],
            Bucket::Evening => [
                Theme::PlayerSuccessStory,
                Theme::TrainingTips,
                Theme::TechniqueGuide,
                Theme::EquipmentComparison,
            ],
        }
    }

    pub fn pick_theme<R: Rng + ?Sized>(&self, rng: &mut R) -> Theme {
        let themes = self.themes();
        themes[rng.random_range(0..themes.len())].clone()
    }

    pub fn for_time(time: NaiveTime) -> Self {
        match time.hour() {
            0..=11 => Bucket::Morning,
            12..=16 => Bucket::Afternoon,
            _ => Bucket::Evening,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Bucket {
    type Err = BlogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "morning" | "9am" => Ok(Bucket::Morning),
            "afternoon" | "12pm" | "3pm" => Ok(Bucket::Afternoon),
            "evening" | "5pm" | "7pm" => Ok(Bucket::Evening),
            other => Err(BlogError::Config(format!(
                "unknown time slot {:?} (expected morning, afternoon, evening, 9am, 12pm, 3pm, 5pm or 7pm)",
                other
            ))),
        }
    }
}

const UTR_STRATEGIES: &[Block] = &[
    Block {
        title: "Consistent Match Play",
        description: "Play at least 3-4 competitive matches per week. UTR is based on match results, so regular competition is essential.",
    },
    Block {
        title: "Targeted Practice Sessions",
        description: "Focus on your weaknesses during practice. If you struggle with backhands, dedicate 30% of practice time to backhand drills.",
    },
    Block {
        title: "Mental Game Development",
        description: "Work on staying calm under pressure and maintaining focus during crucial points. Mental toughness often determines match outcomes.",
    },
    Block {
        title: "Physical Conditioning",
        description: "Improve your fitness to maintain consistent performance throughout long matches. Endurance training is crucial for UTR improvement.",
    },
    Block {
        title: "Equipment Optimization",
        description: "Ensure your racket, strings, and other equipment are properly suited to your playing style and skill level.",
    },
];

const TECHNIQUE_BLOCKS: &[Block] = &[
    Block {
        title: "Split Step Timing",
        description: "Land your split step as your opponent makes contact. Good timing here makes every first move faster.",
    },
    Block {
        title: "Unit Turn",
        description: "Turn shoulders and hips together before the racket moves back. It loads the stroke and keeps your swing compact.",
    },
    Block {
        title: "Contact in Front",
        description: "Meet the ball out in front of your body. Late contact costs both power and direction.",
    },
    Block {
        title: "Full Follow-Through",
        description: "Finish over the opposite shoulder on groundstrokes. A complete finish adds spin and protects your arm.",
    },
];

const COMPARISON_BLOCKS: &[Block] = &[
    Block {
        title: "Head Size",
        description: "Larger heads forgive off-center hits and add power; smaller heads reward precise swings with control.",
    },
    Block {
        title: "Weight and Balance",
        description: "Heavier, head-light frames feel stable at the net; lighter frames are easier to swing fast from the baseline.",
    },
    Block {
        title: "String Pattern",
        description: "Open patterns such as 16x19 grab the ball for spin; dense patterns such as 18x20 flatten the trajectory.",
    },
    Block {
        title: "Skill Level Fit",
        description: "Pick a frame rated for the level you play at today, not the level you hope to reach next year.",
    },
];

const TRAINING_BLOCKS: &[Block] = &[
    Block {
        title: "Warm Up With Purpose",
        description: "Spend ten minutes on dynamic movement and mini tennis before hitting full pace.",
    },
    Block {
        title: "Drill Your Patterns",
        description: "Repeat the two or three patterns you use most in matches until they hold up under pressure.",
    },
    Block {
        title: "Track Your Sessions",
        description: "Write down what you worked on and how it felt. Trends show up faster on paper than in memory.",
    },
    Block {
        title: "Recover Properly",
        description: "Sleep, hydration, and rest days are part of training. Tired legs produce sloppy footwork.",
    },
];

const FUNDAMENTAL_BLOCKS: &[Block] = &[
    Block {
        title: "Practice Consistently",
        description: "Short, frequent sessions beat occasional marathons for building reliable strokes.",
    },
    Block {
        title: "Use the Right Equipment",
        description: "A racket matched to your swing makes good technique easier to repeat.",
    },
    Block {
        title: "Compete Regularly",
        description: "Matches expose what practice hides. Play often and learn from every result.",
    },
];
