use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "Amber", "Blazing", "Calm", "Daring", "Eager", "Frosty", "Grand", "Hidden",
    "Iron", "Jolly", "Keen", "Lucky", "Misty", "Nimble", "Polar", "Rapid",
];

const NOUNS: &[&str] = &[
    "Badger", "Comet", "Drake", "Ember", "Fjord", "Giant", "Harbor", "Island",
    "Jaguar", "Knight", "Lantern", "Meadow", "Nomad", "Orchid", "Pioneer", "Quartz",
];

pub fn generate_participant_id() -> String {
    let mut rng = rand::rng();
    let adjective = ADJECTIVES[rng.random_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.random_range(0..NOUNS.len())];
    format!("{} {}", adjective, noun)
}

pub fn generate_session_id() -> String {
    let mut rng = rand::rng();
    let adjective = ADJECTIVES[rng.random_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.random_range(0..NOUNS.len())];
    let number: u16 = rng.random_range(0..1000);
    format!(
        "{}-{}-{:03}",
        adjective.to_lowercase(),
        noun.to_lowercase(),
        number
    )
}
