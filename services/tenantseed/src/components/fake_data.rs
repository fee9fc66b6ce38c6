use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use component_store::prelude::*;

use crate::models::application::ApplicationRecord;
use crate::models::user::UserRecord;

const DEFAULT_EMAIL_DOMAIN: &str = "example.test";
const PASSWORD_LEN: usize = 12;
const RUN_TAG_LEN: usize = 4;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Barbara", "Claude", "Donald", "Edsger", "Frances", "Grace", "Hedy", "Ivan",
    "John", "Katherine", "Linus", "Margaret", "Niklaus", "Radia", "Sophie", "Tim",
];

const LAST_NAMES: &[&str] = &[
    "Allen", "Backus", "Cerf", "Dijkstra", "Engelbart", "Hamilton", "Hopper", "Johnson",
    "Kernighan", "Knuth", "Lamarr", "Liskov", "Lovelace", "McCarthy", "Perlman", "Ritchie",
    "Turing", "Wirth",
];

const COMPANY_SUFFIXES: &[&str] = &["Group", "Inc", "LLC", "and Sons", "Partners", "Labs"];

const ADJECTIVES: &[&str] = &[
    "Awesome", "Ergonomic", "Fantastic", "Gorgeous", "Handcrafted", "Intelligent", "Practical",
    "Refined", "Rustic", "Sleek", "Small", "Tasty",
];

const MATERIALS: &[&str] = &[
    "Bronze", "Concrete", "Cotton", "Fresh", "Granite", "Metal", "Plastic", "Rubber", "Soft",
    "Steel", "Wooden",
];

const PRODUCTS: &[&str] = &[
    "Bacon", "Bike", "Chair", "Cheese", "Chips", "Computer", "Gloves", "Hat", "Keyboard", "Mouse",
    "Pants", "Shirt", "Shoes", "Table",
];

const PHRASE_ADJECTIVES: &[&str] = &[
    "Adaptive", "Balanced", "Centralized", "Distributed", "Ergonomic", "Fully-configurable",
    "Multi-layered", "Persistent", "Proactive", "Robust", "Seamless", "Virtual",
];

const PHRASE_DESCRIPTORS: &[&str] = &[
    "asynchronous", "bi-directional", "content-based", "dynamic", "explicit", "fault-tolerant",
    "heuristic", "modular", "real-time", "stateless", "zero-defect",
];

const PHRASE_NOUNS: &[&str] = &[
    "architecture", "capability", "encoding", "framework", "hierarchy", "interface", "migration",
    "paradigm", "pipeline", "protocol", "throughput", "workforce",
];

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, words: &[&'a str]) -> &'a str {
    words.choose(rng).copied().unwrap_or_default()
}

fn slug(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

///
/// Synthetic records for the entities a run creates.
///
/// Usernames, emails and org names end with a per-instance tag and a
/// sequence number, so no two records of one instance collide.
///
pub struct FakeData {
    rng: Mutex<StdRng>,
    email_domain: String,
    run_tag: String,
    sequence: AtomicU64,
}

impl InitComponent for FakeData {
    fn init(
        _: ComponentResolver,
        config: Box<dyn ConfigProvider>,
    ) -> ComponentFuture<Result<Self, ComponentError>> {
        Box::pin(async move {
            let seed = config.get_opt_u64("seed")?;
            let email_domain = config
                .get_opt_str("email_domain")?
                .unwrap_or(DEFAULT_EMAIL_DOMAIN)
                .to_string();

            Ok(FakeData::new(seed, email_domain))
        })
    }
}

impl ShutdownComponent for FakeData {}

impl ComponentName for FakeData {
    fn component_name() -> &'static str {
        "fake-data"
    }
}

impl Component for FakeData {}

impl FakeData {
    pub fn new(seed: Option<u64>, email_domain: String) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let run_tag = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(RUN_TAG_LEN)
            .map(char::from)
            .collect::<String>()
            .to_lowercase();

        Self {
            rng: Mutex::new(rng),
            email_domain,
            run_tag,
            sequence: AtomicU64::new(1),
        }
    }

    fn unique_suffix(&self) -> String {
        format!("{}{}", self.run_tag, self.sequence.fetch_add(1, Ordering::Relaxed))
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    pub fn user(&self) -> UserRecord {
        let suffix = self.unique_suffix();

        self.with_rng(|rng| {
            let first_name = pick(rng, FIRST_NAMES);
            let last_name = pick(rng, LAST_NAMES);
            let number: u16 = rng.gen_range(1..1000);
            let separator = *[".", "_"].choose(rng).unwrap_or(&".");

            let username = format!(
                "{}{}{}{}_{}",
                slug(first_name),
                separator,
                slug(last_name),
                number,
                suffix
            );
            let email = format!(
                "{}.{}{}.{}@{}",
                slug(first_name),
                slug(last_name),
                number,
                suffix,
                self.email_domain
            );
            let password = rng
                .sample_iter(&Alphanumeric)
                .take(PASSWORD_LEN)
                .map(char::from)
                .collect();

            UserRecord {
                username,
                email,
                password,
                name: format!("{} {}", first_name, last_name),
            }
        })
    }

    pub fn org_name(&self) -> String {
        let unique = self.unique_suffix().to_uppercase();

        self.with_rng(|rng| {
            let founder = pick(rng, LAST_NAMES);
            let partner = pick(rng, LAST_NAMES);
            let suffix = pick(rng, COMPANY_SUFFIXES);

            if rng.gen_bool(0.5) {
                format!("{} {} {}", founder, suffix, unique)
            } else {
                format!("{}, {} and {} {}", founder, partner, suffix, unique)
            }
        })
    }

    pub fn application(&self) -> ApplicationRecord {
        self.with_rng(|rng| {
            let name = format!(
                "{} {} {}",
                pick(rng, ADJECTIVES),
                pick(rng, MATERIALS),
                pick(rng, PRODUCTS)
            );
            let description = format!(
                "{} {} {}",
                pick(rng, PHRASE_ADJECTIVES),
                pick(rng, PHRASE_DESCRIPTORS),
                pick(rng, PHRASE_NOUNS)
            );

            ApplicationRecord { name, description }
        })
    }
}
