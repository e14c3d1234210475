//! `skimmer classify`: Show which pipeline a message would take.

pub fn run(text: &str) {
    println!("{}", skimmer_agent::classify(text));
}
