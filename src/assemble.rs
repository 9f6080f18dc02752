use chrono::Local;
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, warn};

use crate::backend::{ContentBackend, Generated};
use crate::catalog::CatalogRecord;
use crate::config::SiteConfig;
use crate::drills::{self, DRILLS};
use crate::post::{Document, Metadata, TIMESTAMP_FORMAT};
use crate::theme::{Block, DAILY_TITLES, DEFAULT_TITLE, RecordFilter, Strategy, Theme};

pub const TOP_N: usize = 10;
const KEYWORDS_PER_POST: usize = 6;
const META_DESCRIPTION_LIMIT: usize = 160;

static SEO_KEYWORDS: [&str; 16] = [
    "tennis drills",
    "best tennis racket",
    "improve footwork",
    "AcePlan",
    "tennis training",
    "tennis equipment",
    "tennis technique",
    "tennis tips",
    "tennis racket guide",
    "tennis practice",
    "tennis improvement",
    "tennis coaching",
    "UTR improvement",
    "tennis spin rackets",
    "tennis control rackets",
    "tennis power rackets",
];

struct PlayerProfile {
    name: &'static str,
    age: u8,
    location: &'static str,
    starting_utr: f32,
    current_utr: f32,
    timeframe: &'static str,
    routine: &'static str,
    key_factors: [&'static str; 4],
}

static PLAYER_PROFILES: [PlayerProfile; 3] = [
    PlayerProfile {
        name: "Sarah Chen",
        age: 16,
        location: "California",
        starting_utr: 3.5,
        current_utr: 10.2,
        timeframe: "18 months",
        routine: "Daily 2-hour practice sessions, 3x weekly fitness training, weekend tournaments",
        key_factors: [
            "Consistent daily practice",
            "Professional coaching",
            "Mental training",
            "Tournament experience",
        ],
    },
    PlayerProfile {
        name: "Marcus Rodriguez",
        age: 17,
        location: "Texas",
        starting_utr: 4.0,
        current_utr: 10.5,
        timeframe: "2 years",
        routine: "Morning practice 6 AM, afternoon matches, evening fitness, weekly lessons",
        key_factors: [
            "Early morning discipline",
            "Match play focus",
            "Physical conditioning",
            "Technical refinement",
        ],
    },
    PlayerProfile {
        name: "Emma Thompson",
        age: 15,
        location: "Florida",
        starting_utr: 3.0,
        current_utr: 10.0,
        timeframe: "20 months",
        routine: "School tennis team, private lessons, weekend tournaments, summer camps",
        key_factors: [
            "Team environment",
            "Structured coaching",
            "Competitive exposure",
            "Year-round training",
        ],
    },
];

/// Picks the records for a top list: the first matches of `filter`, or a
/// random sample when there is no filter or nothing matches.
pub fn select_top<'c, R: Rng + ?Sized>(
    filter: Option<RecordFilter>,
    catalog: &'c [CatalogRecord],
    rng: &mut R,
) -> Vec<&'c CatalogRecord> {
    if let Some(filter) = filter {
        let matched: Vec<_> = catalog.iter().filter(|r| filter(r)).take(TOP_N).collect();
        if !matched.is_empty() {
            return matched;
        }
        debug!("No catalog records match the theme filter, sampling instead");
    }

    catalog.choose_multiple(rng, TOP_N).collect()
}

pub struct Assembler<'a> {
    backend: &'a ContentBackend,
    site: &'a SiteConfig,
}

// Sections collected for one post, plus whether any prose was canned.
struct Draft {
    sections: Vec<String>,
    degraded: bool,
    // Text the meta description previews instead of the first section.
    preview: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Bonus {
    Tip,
    RelatedDrill,
    RacketPick,
}

impl Draft {
    fn new() -> Self {
        Self {
            sections: Vec::new(),
            degraded: false,
            preview: None,
        }
    }

    fn push(&mut self, section: impl Into<String>) {
        self.sections.push(section.into());
    }

    fn prose(&mut self, generated: Generated) -> String {
        self.degraded |= generated.is_fallback();
        generated.into_inner()
    }
}

impl<'a> Assembler<'a> {
    pub fn new(backend: &'a ContentBackend, site: &'a SiteConfig) -> Self {
        Self { backend, site }
    }

    pub async fn assemble<R: Rng + ?Sized>(&self, theme: &Theme, catalog: &[CatalogRecord], rng: &mut R) -> Document {
        let mut draft = Draft::new();

        let mut strategy = theme.strategy();
        if matches!(strategy, Strategy::Review | Strategy::Daily) && catalog.is_empty() {
            warn!(theme = %theme, "Empty catalog, writing a general guide instead");
            strategy = Theme::Other(theme.id().to_string()).strategy();
        }

        let title = match strategy {
            Strategy::TopList(filter) => {
                let title = theme.title_template().to_string();
                self.top_list(&mut draft, &title, filter, catalog, rng).await;
                title
            }
            Strategy::Review => match catalog.choose(rng) {
                Some(record) => {
                    self.review(&mut draft, record).await;
                    theme.title_template().replace("{name}", &record.name)
                }
                None => DEFAULT_TITLE.to_string(),
            },
            Strategy::Guide { heading, blocks } => {
                self.guide(&mut draft, theme, heading, blocks).await;
                match theme {
                    Theme::RacketReview | Theme::DailyPost => DEFAULT_TITLE.to_string(),
                    _ => theme.title_template().to_string(),
                }
            }
            Strategy::SuccessStory => {
                let profile = PLAYER_PROFILES
                    .choose(rng)
                    .unwrap_or(&PLAYER_PROFILES[0]);
                self.success_story(&mut draft, profile).await;
                theme.title_template().to_string()
            }
            Strategy::Daily => match catalog.choose(rng) {
                Some(record) => {
                    let template = DAILY_TITLES.choose(rng).unwrap_or(&DAILY_TITLES[0]);
                    self.daily_post(&mut draft, record, catalog, rng).await;
                    template.replace("{name}", &record.name)
                }
                None => DEFAULT_TITLE.to_string(),
            },
        };

        let preview = draft
            .preview
            .as_deref()
            .or(draft.sections.first().map(String::as_str))
            .unwrap_or("");
        let description = meta_description(&title, preview, &self.site.name);
        let keywords: Vec<String> = SEO_KEYWORDS
            .choose_multiple(rng, KEYWORDS_PER_POST)
            .map(|k| k.to_string())
            .collect();

        let meta = Metadata {
            theme: theme.id().to_string(),
            category: theme.category().to_string(),
            tags: theme.tags().iter().map(|t| t.to_string()).collect(),
            keywords,
            description,
            generated_at: Local::now(),
            degraded: draft.degraded,
        };

        Document {
            title,
            lead: format!("**Meta Description:** {}\n\n---", meta.description),
            sections: draft.sections,
            footer: self.footer(&meta),
            meta,
        }
    }

    async fn top_list<R: Rng + ?Sized>(
        &self,
        draft: &mut Draft,
        title: &str,
        filter: Option<RecordFilter>,
        catalog: &[CatalogRecord],
        rng: &mut R,
    ) {
        let prompt = format!(
            "Write an engaging introduction for a blog post titled \"{}\". \
             Explain why these rackets are important for tennis players and what makes them special. \
             Include information about how to choose the right racket for your playing style. \
             Keep it under 200 words and make it SEO-friendly.",
            title
        );
        let intro = self.backend.generate(&prompt, 300).await;
        let intro = draft.prose(intro);
        draft.push(intro);

        let selected = select_top(filter, catalog, rng);
        if selected.is_empty() {
            return;
        }
        draft.push(format!("## {}", title));

        for (i, record) in selected.into_iter().enumerate() {
            let prompt = format!(
                "In one sentence, explain why the {} ({} racket, {}, {} head) suits players looking for {}.",
                record.name, record.racket_type, record.weight, record.head_size, record.best_for
            );
            let why = match self.backend.generate(&prompt, 60).await {
                Generated::Primary(text) => text,
                Generated::Fallback(_) => {
                    draft.degraded = true;
                    why_its_great(record)
                }
            };

            let mut block = format!(
                "### {}. {}\n\n\
                 **Type:** {} | **Weight:** {} | **Head Size:** {} | **Balance:** {}\n\n\
                 **Best For:** {}\n\n\
                 **Standout Technology:** {}\n\n\
                 **Skill Level:** {}\n\n\
                 **Why It's Great:** {}",
                i + 1,
                record.name,
                record.racket_type,
                record.weight,
                record.head_size,
                record.balance,
                record.best_for,
                record.standout_tech,
                record.skill_level,
                why
            );
            if !record.affiliate_link.is_empty() {
                block.push_str(&format!("\n\n**[Get the {} here]({})**", record.name, record.affiliate_link));
            }
            block.push_str("\n\n---");
            draft.push(block);
        }
    }

    async fn review(&self, draft: &mut Draft, record: &CatalogRecord) {
        let prompt = format!(
            "Write a detailed, in-depth review of the {} tennis racket. \
             Include analysis of its performance characteristics, who it's best suited for, and how it compares to similar rackets. \
             Include specific details about the racket's technology and performance. Keep it under 400 words.",
            record.name
        );
        let narrative = self.backend.generate(&prompt, 500).await;
        let narrative = draft.prose(narrative);
        draft.push(narrative);

        draft.push(format!(
            "## {} - Technical Specifications\n\n\
             - **Type:** {}\n\
             - **Weight:** {} (unstrung)\n\
             - **Head Size:** {}\n\
             - **Balance:** {}\n\
             - **String Pattern:** {}\n\
             - **Best For:** {}\n\
             - **Standout Technology:** {}\n\
             - **Skill Level:** {}",
            record.name,
            record.racket_type,
            record.weight,
            record.head_size,
            record.balance,
            record.string_pattern,
            record.best_for,
            record.standout_tech,
            record.skill_level
        ));

        // Static template; only the record's own fields vary.
        draft.push(format!(
            "## Pros and Cons\n\n\
             **Pros:**\n\
             - Excellent {} performance\n\
             - Advanced {} technology\n\
             - Suitable for {} players\n\
             - Professional-grade construction\n\n\
             **Cons:**\n\
             - Higher price point\n\
             - May require adjustment period\n\
             - Not suitable for complete beginners",
            record.best_for.to_lowercase(),
            record.standout_tech,
            record.skill_level.to_lowercase()
        ));

        if !record.affiliate_link.is_empty() {
            draft.push(format!(
                "## Where to Buy\n\nReady to try the {}? **[Get it here with our affiliate link]({})** and support {} while getting your new racket!",
                record.name, record.affiliate_link, self.site.name
            ));
        }
    }

    async fn guide(&self, draft: &mut Draft, theme: &Theme, heading: &str, blocks: &[Block]) {
        let prompt = match theme {
            Theme::ImproveUtrFast => "Write a comprehensive guide on how to improve your UTR (Universal Tennis Rating) quickly and effectively. \
                 Include specific strategies, training methods, and mental approaches that help players see rapid improvement. \
                 Focus on practical, actionable advice that beginners and intermediate players can implement immediately. \
                 Keep it engaging and motivational. Aim for 400-500 words."
                .to_string(),
            _ => format!(
                "Write an engaging, informative blog post about {} in tennis. \
                 Make it beginner-friendly but informative, include practical tips and advice. \
                 Keep it around 400-500 words and make it SEO-optimized.",
                theme.topic()
            ),
        };
        let prose = self.backend.generate(&prompt, 600).await;
        let prose = draft.prose(prose);
        draft.push(prose);

        let mut section = format!("## {}", heading);
        for (i, block) in blocks.iter().enumerate() {
            section.push_str(&format!("\n\n### {}. {}\n\n{}", i + 1, block.title, block.description));
        }
        draft.push(section);

        if !matches!(theme, Theme::ImproveUtrFast) {
            draft.push(format!(
                "For more tennis tips, equipment reviews, and training guides, visit [{}]({}) and explore our comprehensive racket database.",
                self.site.name, self.site.url
            ));
        }
    }

    async fn success_story(&self, draft: &mut Draft, profile: &PlayerProfile) {
        let prompt = format!(
            "Write an inspiring success story about {}, a {}-year-old tennis player from {} \
             who improved from UTR {} to UTR {} in {}. \
             Emphasize their training routine: {}. Key factors in their success: {}. \
             Make it motivational and relatable for other young tennis players. Keep it under 300 words.",
            profile.name,
            profile.age,
            profile.location,
            profile.starting_utr,
            profile.current_utr,
            profile.timeframe,
            profile.routine,
            profile.key_factors.join(", ")
        );
        let story = self.backend.generate(&prompt, 500).await;
        let story = draft.prose(story);
        draft.push(story);

        draft.push(format!(
            "## {} at a Glance\n\n\
             - **Age:** {}\n\
             - **Location:** {}\n\
             - **UTR:** {} to {} in {}\n\
             - **Routine:** {}\n\
             - **Success Factors:** {}\n\n\
             {}'s story shows that with the right training routine and dedication, significant improvement is possible. \
             For personalized training plans and equipment recommendations, visit [{}]({}).",
            profile.name,
            profile.age,
            profile.location,
            profile.starting_utr,
            profile.current_utr,
            profile.timeframe,
            profile.routine,
            profile.key_factors.join(", "),
            profile.name,
            self.site.name,
            self.site.url
        ));
    }

    async fn daily_post<R: Rng + ?Sized>(
        &self,
        draft: &mut Draft,
        record: &CatalogRecord,
        catalog: &[CatalogRecord],
        rng: &mut R,
    ) {
        let footwork = drills::in_category("footwork");
        let drill = footwork.choose(rng).copied().unwrap_or(&DRILLS[0]);
        let profile = PLAYER_PROFILES.choose(rng).unwrap_or(&PLAYER_PROFILES[0]);

        draft.preview = Some(format!(
            "Learn about the {} racket, essential footwork drills, and inspiring player success stories.",
            record.name
        ));

        let prompt = format!(
            "Write a detailed analysis of the {} tennis racket. Explain why it's great for \
             spin generation and control, power and shot depth, and overall control and precision. \
             Include specific technical details about weight ({}), head size ({}) and balance ({}). \
             Make it beginner-friendly but informative. Keep it under 200 words.",
            record.name, record.weight, record.head_size, record.balance
        );
        let gear = self.backend.generate(&prompt, 300).await;
        let gear = draft.prose(gear);
        draft.push(format!(
            "## Gear Highlight: {}\n\n{}\n\n\
             For more detailed racket reviews and our complete racket database, visit [{}]({}) to find the perfect racket for your game.\n\n---",
            record.name, gear, self.site.name, self.site.url
        ));

        let prompt = format!(
            "Write a beginner-friendly explanation of the {} tennis drill, a {} {} drill: {}. \
             Explain why this drill is important for improving footwork and tennis performance. \
             Provide clear, actionable steps, tips for proper form and common mistakes to avoid. \
             Keep it under 250 words and make it engaging.",
            drill.name,
            drill.difficulty,
            drill.category,
            drill.description.to_lowercase()
        );
        let advice = self.backend.generate(&prompt, 400).await;
        let advice = draft.prose(advice);
        draft.push(format!(
            "## Drill Advice: {}\n\n{}\n\n{}\n\n---",
            drill.name,
            advice,
            drill.instructions_block()
        ));

        self.success_story(draft, profile).await;
        let story = draft.sections.split_off(draft.sections.len() - 2).join("\n\n");
        draft.push(format!(
            "## Player Story: {}'s Journey to UTR {}\n\n{}\n\n---",
            profile.name, profile.current_utr, story
        ));

        let bonus = [Bonus::Tip, Bonus::RelatedDrill, Bonus::RacketPick]
            .choose(rng)
            .copied()
            .unwrap_or(Bonus::Tip);
        let prompt = match bonus {
            Bonus::Tip => "Write a practical tennis tip that beginners and intermediate players can immediately apply to improve their game. \
                 Focus on a specific aspect like mental game, nutrition, recovery, or equipment care. \
                 Make it actionable and valuable. Keep it under 150 words."
                .to_string(),
            Bonus::RelatedDrill => {
                let other = DRILLS.choose(rng).unwrap_or(&DRILLS[0]);
                format!(
                    "Write about a related tennis drill that complements the {} mentioned earlier. \
                     Explain how this drill works together with the main drill to improve overall tennis performance. \
                     Keep it under 150 words.",
                    other.name
                )
            }
            Bonus::RacketPick => {
                let alternative = catalog.choose(rng).unwrap_or(record);
                format!(
                    "Write a brief recommendation for the {} as an alternative or complementary racket choice. \
                     Explain why this racket might be suitable for different playing styles or skill levels. \
                     Keep it under 150 words.",
                    alternative.name
                )
            }
        };
        debug!(bonus = ?bonus, "Writing bonus section");
        let extra = self.backend.generate(&prompt, 250).await;
        let extra = draft.prose(extra);
        draft.push(format!(
            "## Bonus Section\n\n{}\n\n\
             For more tennis tips, drills, and equipment reviews, explore our comprehensive resources at [{}]({}).",
            extra, self.site.name, self.site.url
        ));
    }

    fn footer(&self, meta: &Metadata) -> String {
        format!(
            "---\n\n\
             ## Conclusion\n\n\
             Whether you're looking to improve your UTR rating, find the perfect racket, or enhance your tennis game, the right approach and equipment make all the difference.\n\n\
             For more comprehensive tennis resources, equipment reviews, and training guides, visit [{name}]({url}) and explore our extensive racket database to find the perfect equipment for your game.\n\n\
             ---\n\n\
             **Keywords:** {keywords}\n\
             **Category:** {category}\n\
             **Generated:** {generated}\n\
             **Website:** {url}\n\
             **Database:** {database}",
            name = self.site.name,
            url = self.site.url,
            keywords = meta.keywords.join(", "),
            category = meta.category,
            generated = meta.generated_at.format(TIMESTAMP_FORMAT),
            database = self.site.database_url,
        )
    }
}

fn why_its_great(record: &CatalogRecord) -> String {
    format!(
        "This racket excels in {} with its {} technology, making it perfect for players seeking {} characteristics.",
        record.best_for.to_lowercase(),
        record.standout_tech,
        record.racket_type.to_lowercase()
    )
}

fn meta_description(title: &str, preview: &str, site_name: &str) -> String {
    let preview: String = preview.chars().take(100).collect();
    let description = format!(
        "Discover {}. {}... Learn tennis tips, equipment reviews, and training guides at {}.",
        title.to_lowercase(),
        preview.trim(),
        site_name
    );
    description.chars().take(META_DESCRIPTION_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Measurement, fallback_records};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn racket(name: &str, racket_type: &str, best_for: &str, skill: &str) -> CatalogRecord {
        CatalogRecord {
            id: name.to_string(),
            name: name.to_string(),
            racket_type: racket_type.to_string(),
            weight: Measurement::parse("300", "g"),
            head_size: Measurement::parse("100", "in²"),
            balance: Measurement::parse("32", "cm"),
            string_pattern: "16x19".into(),
            best_for: best_for.to_string(),
            standout_tech: "Graphene".into(),
            skill_level: skill.to_string(),
            affiliate_link: format!("https://example.com/{}", name),
        }
    }

    fn site() -> SiteConfig {
        SiteConfig::default()
    }

    fn numbered_items(doc: &Document) -> usize {
        doc.sections.iter().filter(|s| s.starts_with("### ")).count()
    }

    #[tokio::test]
    async fn every_theme_assembles_on_empty_catalog() {
        let backend = ContentBackend::default();
        let site = site();
        let assembler = Assembler::new(&backend, &site);
        let mut rng = StdRng::seed_from_u64(1);

        let mut themes = Theme::REGISTERED.to_vec();
        themes.push(Theme::Other("serve_and_volley".into()));
        themes.push(Theme::Other("top_10_lightweight_rackets".into()));
        themes.push(Theme::DailyPost);

        for theme in themes {
            let doc = assembler.assemble(&theme, &[], &mut rng).await;
            assert!(doc.validate().is_ok(), "{} produced an invalid document", theme);
            assert!(doc.footer.contains("## Conclusion"));
            assert!(doc.lead.starts_with("**Meta Description:** "));
            assert!(doc.meta.degraded);
        }
    }

    #[tokio::test]
    async fn top_list_caps_at_ten() {
        let catalog: Vec<_> = (0..25)
            .map(|i| racket(&format!("Power Frame {}", i), "Power", "Power", "Advanced"))
            .collect();
        let backend = ContentBackend::default();
        let site = site();
        let assembler = Assembler::new(&backend, &site);
        let mut rng = StdRng::seed_from_u64(2);

        let doc = assembler.assemble(&Theme::TopPowerRackets, &catalog, &mut rng).await;
        assert_eq!(numbered_items(&doc), TOP_N);
        assert!(doc.render().contains("### 1. Power Frame 0"));
        assert!(doc.render().contains("### 10. Power Frame 9"));
    }

    #[tokio::test]
    async fn top_list_accepts_few_matches() {
        let catalog = vec![
            racket("Spin One", "Tweener", "Spin", "Intermediate"),
            racket("Control One", "Control", "Precision", "Advanced"),
            racket("Spin Two", "Tweener", "Topspin", "Advanced"),
        ];
        let backend = ContentBackend::default();
        let site = site();
        let assembler = Assembler::new(&backend, &site);
        let mut rng = StdRng::seed_from_u64(3);

        let doc = assembler.assemble(&Theme::TopSpinRackets, &catalog, &mut rng).await;
        let rendered = doc.render();
        assert_eq!(numbered_items(&doc), 2);
        assert!(rendered.contains("Spin One"));
        assert!(rendered.contains("Spin Two"));
        assert!(!rendered.contains("Control One"));
    }

    #[test]
    fn power_selection_on_fallback_catalog() {
        let catalog = fallback_records();
        let mut rng = StdRng::seed_from_u64(4);
        let Strategy::TopList(filter) = Theme::TopPowerRackets.strategy() else {
            panic!("expected a top list");
        };

        let selected = select_top(filter, &catalog, &mut rng);
        assert!(selected.len() <= catalog.len());
        assert!(selected.iter().all(|r| r.racket_type.to_lowercase().contains("power")));
    }

    #[test]
    fn unmatched_filter_samples_from_catalog() {
        let catalog = vec![racket("Control One", "Control", "Precision", "Advanced")];
        let mut rng = StdRng::seed_from_u64(5);
        let Strategy::TopList(filter) = Theme::TopPowerRackets.strategy() else {
            panic!("expected a top list");
        };

        let selected = select_top(filter, &catalog, &mut rng);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "Control One");
    }

    #[tokio::test]
    async fn review_uses_the_same_record_for_title_and_body() {
        let catalog = vec![racket("Head Gravity Pro", "Control", "Feel", "Advanced")];
        let backend = ContentBackend::default();
        let site = site();
        let assembler = Assembler::new(&backend, &site);
        let mut rng = StdRng::seed_from_u64(6);

        let doc = assembler.assemble(&Theme::RacketReview, &catalog, &mut rng).await;
        assert_eq!(doc.title, "Complete Review: Head Gravity Pro Tennis Racket");
        let rendered = doc.render();
        assert!(rendered.contains("## Head Gravity Pro - Technical Specifications"));
        assert!(rendered.contains("- Excellent feel performance"));
        assert!(rendered.contains("https://example.com/Head Gravity Pro"));
    }

    #[tokio::test]
    async fn success_story_names_a_profile() {
        let backend = ContentBackend::default();
        let site = site();
        let assembler = Assembler::new(&backend, &site);
        let mut rng = StdRng::seed_from_u64(8);

        let doc = assembler.assemble(&Theme::PlayerSuccessStory, &[], &mut rng).await;
        assert!(PLAYER_PROFILES.iter().any(|p| doc.render().contains(&format!("## {} at a Glance", p.name))));
        assert_eq!(doc.meta.category, "inspiration");
    }

    #[tokio::test]
    async fn daily_post_combines_gear_drill_story_and_bonus() {
        let catalog = vec![racket("Head Gravity Pro", "Control", "Feel", "Advanced")];
        let backend = ContentBackend::default();
        let site = site();
        let assembler = Assembler::new(&backend, &site);
        let mut rng = StdRng::seed_from_u64(10);

        let doc = assembler.assemble(&Theme::DailyPost, &catalog, &mut rng).await;
        assert!(doc.validate().is_ok());
        assert!(DAILY_TITLES.iter().any(|t| t.replace("{name}", "Head Gravity Pro") == doc.title));
        assert_eq!(doc.meta.theme, "daily_tennis_post");
        assert_eq!(doc.meta.category, "training");
        assert!(doc.meta.description.contains("Learn about the Head Gravity Pro racket"));

        let headings: Vec<_> = doc.sections.iter().filter_map(|s| s.lines().next()).collect();
        assert_eq!(headings.len(), 4);
        assert_eq!(headings[0], "## Gear Highlight: Head Gravity Pro");
        assert!(DRILLS.iter().any(|d| headings[1] == format!("## Drill Advice: {}", d.name)));
        assert!(PLAYER_PROFILES
            .iter()
            .any(|p| headings[2] == format!("## Player Story: {}'s Journey to UTR {}", p.name, p.current_utr)));
        assert_eq!(headings[3], "## Bonus Section");

        let rendered = doc.render();
        assert!(rendered.contains("This drill focuses on improving fundamental tennis skills"));
        assert!(rendered.contains("**Step-by-Step Instructions:**\n1. "));
        assert!(rendered.contains("**Focus Areas:** "));
        assert!(rendered.contains("at a Glance"));
        assert!(doc.meta.degraded);
    }

    #[tokio::test]
    async fn daily_post_on_empty_catalog_becomes_a_guide() {
        let backend = ContentBackend::default();
        let site = site();
        let assembler = Assembler::new(&backend, &site);
        let mut rng = StdRng::seed_from_u64(12);

        let doc = assembler.assemble(&Theme::DailyPost, &[], &mut rng).await;
        assert_eq!(doc.title, DEFAULT_TITLE);
        assert!(!doc.render().contains("## Gear Highlight"));
        assert_eq!(doc.meta.theme, "daily_tennis_post");
    }

    #[tokio::test]
    async fn footer_carries_keywords_and_links() {
        let backend = ContentBackend::default();
        let site = site();
        let assembler = Assembler::new(&backend, &site);
        let mut rng = StdRng::seed_from_u64(9);

        let doc = assembler.assemble(&Theme::ImproveUtrFast, &[], &mut rng).await;
        assert_eq!(doc.meta.keywords.len(), KEYWORDS_PER_POST);
        let footer = &doc.footer;
        assert!(footer.contains(&format!("**Keywords:** {}", doc.meta.keywords.join(", "))));
        assert!(footer.contains("**Website:** https://aceplan.me"));
        assert!(doc.render().contains("### 5. Equipment Optimization"));
        assert!(doc.meta.description.chars().count() <= META_DESCRIPTION_LIMIT);
    }

    #[test]
    fn meta_description_is_truncated_on_char_boundary() {
        let description = meta_description(&"Ü".repeat(300), "preview", "AcePlan");
        assert_eq!(description.chars().count(), META_DESCRIPTION_LIMIT);
    }
}
