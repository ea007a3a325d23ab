use rand::Rng;
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;

const ADJECTIVES: &[&str] = &[
    "happy", "clever", "brave", "calm", "eager", "fancy", "gentle", "jolly", "kind", "lively",
    "nice", "proud", "silly", "witty", "zealous", "swift", "bright", "cool", "fiery", "lucky",
    "noble", "quiet", "royal", "super", "tiny", "wild", "young", "zesty", "epic", "rapid",
    "azure", "amber", "crimson", "golden", "indigo", "jade", "lemon", "lime", "navy", "olive",
    "teal", "violet", "white", "yellow", "rusty", "snowy", "sunny", "windy", "frosty", "misty",
];

const ANIMALS: &[&str] = &[
    "panda", "tiger", "lion", "eagle", "hawk", "wolf", "bear", "fox", "deer", "koala", "cat",
    "dog", "owl", "seal", "swan", "duck", "frog", "goat", "crab", "fish", "shark", "whale",
    "dolphin", "zebra", "camel", "llama", "moose", "mouse", "rat", "rabbit", "horse", "sheep",
    "cobra", "viper", "gecko", "iguana", "python", "turtle", "beetle", "butterfly", "spider",
    "falcon", "otter", "badger", "beaver", "bison", "dingo", "hyena", "jaguar", "lemur",
];

pub const PASSWORD_LEN: usize = 12;

/// `adjective-animal-NNN`, e.g. `happy-tiger-123`.
pub fn generate_username<R: Rng + ?Sized>(rng: &mut R) -> String {
    let adj = ADJECTIVES.choose(rng).copied().unwrap_or("happy");
    let animal = ANIMALS.choose(rng).copied().unwrap_or("panda");
    let num = rng.gen_range(100..=999);
    format!("{adj}-{animal}-{num}")
}

pub fn generate_password<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..PASSWORD_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}
