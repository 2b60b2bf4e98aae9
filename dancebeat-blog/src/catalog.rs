//! Static content catalog: author personas and topic categories
//!
//! Both tables are compile-time data. Personas only parameterize the
//! generation prompts; categories drive the day-of-year rotation.

use rand::seq::SliceRandom;

/// An author persona used to condition generation prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Persona {
    /// Stable key stored on posts (`character` column)
    pub key: &'static str,
    /// Display name stored as the post author
    pub name: &'static str,
    pub title: &'static str,
    /// Tone descriptors fed into the system prompt
    pub tone: &'static str,
    pub catchphrases: &'static [&'static str],
}

/// A topic category with its pool of topics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicCategory {
    pub name: &'static str,
    pub topics: &'static [&'static str],
}

pub const PERSONAS: &[Persona] = &[
    Persona {
        key: "marisol",
        name: "Marisol Vega",
        title: "Salsa Instructor & Social Butterfly",
        tone: "warm, encouraging, a little dramatic, loves anecdotes from the studio floor",
        catchphrases: &["¡Vamos a bailar!", "The floor is calling", "Lead with your heart"],
    },
    Persona {
        key: "rafa",
        name: "Rafa Moreno",
        title: "Resident DJ & Music Historian",
        tone: "laid-back, music-obsessed, drops track names and production trivia",
        catchphrases: &["Trust the clave", "Listen before you step"],
    },
    Persona {
        key: "elena",
        name: "Elena Petrova",
        title: "Competition Dancer & Technique Coach",
        tone: "precise, analytical, direct but supportive, breaks everything into drills",
        catchphrases: &["Frame first", "Slow is smooth, smooth is fast"],
    },
    Persona {
        key: "tomas",
        name: "Tomás Lindqvist",
        title: "Recovering Beginner",
        tone: "self-deprecating, curious, writes from the perspective of someone still learning",
        catchphrases: &["Two left feet, one big smile"],
    },
];

pub const CATEGORIES: &[TopicCategory] = &[
    TopicCategory {
        name: "salsa",
        topics: &[
            "Mastering the cross body lead",
            "Salsa On1 vs On2: what actually changes",
            "Cuban casino styling for social dancers",
            "How to survive your first salsa social",
            "Musicality drills for salsa dancers",
            "The history of New York mambo",
        ],
    },
    TopicCategory {
        name: "bachata",
        topics: &[
            "Sensual bachata body movement basics",
            "Dominican bachata footwork patterns",
            "Connection and frame in bachata",
            "Five bachata artists you should know",
            "From basic step to turn patterns in bachata",
        ],
    },
    TopicCategory {
        name: "kizomba",
        topics: &[
            "Kizomba walking technique explained",
            "Understanding saida variations",
            "Urban kiz vs traditional kizomba",
            "Finding the ginga in your basic",
        ],
    },
    TopicCategory {
        name: "technique",
        topics: &[
            "Spotting techniques for cleaner turns",
            "Posture fixes that transform your dancing",
            "Weight transfer drills you can do at home",
            "How to practice effectively between classes",
            "Building balance for multiple spins",
            "Leading and following: the invisible conversation",
            "Why your timing drifts and how to fix it",
        ],
    },
    TopicCategory {
        name: "community",
        topics: &[
            "Social dance etiquette everyone should know",
            "How to ask someone to dance (and how to decline)",
            "Making friends through dance",
            "What to expect at your first dance festival",
            "Dance floor hygiene: the unspoken rules",
        ],
    },
    TopicCategory {
        name: "music",
        topics: &[
            "Counting the clave for dancers",
            "How to recognize a bachata intro",
            "Building your social dance playlist",
            "Live band vs DJ nights: dancing the difference",
        ],
    },
];

/// Look up a persona by key
pub fn persona(key: &str) -> Option<&'static Persona> {
    PERSONAS.iter().find(|p| p.key == key)
}

/// Look up a category by name (case-insensitive)
pub fn category(name: &str) -> Option<&'static TopicCategory> {
    CATEGORIES.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

/// Pick a random persona
pub fn random_persona() -> &'static Persona {
    PERSONAS
        .choose(&mut rand::thread_rng())
        .expect("persona catalog is non-empty")
}

/// Pick a random topic from the given category
pub fn random_topic(cat: &'static TopicCategory) -> &'static str {
    cat.topics
        .choose(&mut rand::thread_rng())
        .copied()
        .expect("category topic pools are non-empty")
}

/// Pick a random topic from any category
pub fn random_topic_any() -> (&'static TopicCategory, &'static str) {
    let cat = CATEGORIES
        .choose(&mut rand::thread_rng())
        .expect("category catalog is non-empty");
    (cat, random_topic(cat))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_non_empty() {
        assert!(!PERSONAS.is_empty());
        assert!(!CATEGORIES.is_empty());
        for cat in CATEGORIES {
            assert!(!cat.topics.is_empty(), "category {} has no topics", cat.name);
        }
    }

    #[test]
    fn test_persona_keys_unique() {
        for (i, a) in PERSONAS.iter().enumerate() {
            for b in &PERSONAS[i + 1..] {
                assert_ne!(a.key, b.key);
            }
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(persona("marisol").unwrap().name, "Marisol Vega");
        assert!(persona("nobody").is_none());
        assert_eq!(category("SALSA").unwrap().name, "salsa");
        assert!(category("tango").is_none());
    }

    #[test]
    fn test_cycle_lengths_differ() {
        // Independent rotation cycles only produce a long combined period
        // when the two lengths are not equal.
        assert_ne!(CATEGORIES.len(), PERSONAS.len());
    }
}
