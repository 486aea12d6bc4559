use serde::{Deserialize, Serialize};

/// A production rule: all premises known true derives the conclusion.
///
/// Rule identity is positional. The rule list as a whole is the unit of
/// change: edits rebuild the list and every engine indexed on it, so a rule
/// id is only meaningful against the list revision it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub premises: Vec<String>,
    pub conclusion: String,
}

impl Rule {
    pub fn new<P, S>(premises: P, conclusion: S) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        S: Into<String>,
    {
        Self {
            premises: premises.into_iter().map(Into::into).collect(),
            conclusion: conclusion.into(),
        }
    }
}

/// The built-in animal identification rule set, used to seed an empty
/// rule store and restored by the admin "reset rules" operation.
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule::new(["hair"], "mammal"),
        Rule::new(["have-milk"], "mammal"),
        Rule::new(["feathers"], "bird"),
        Rule::new(["can-fly", "lays-eggs"], "bird"),
        Rule::new(["eats-meat"], "carnivore"),
        Rule::new(["canine-teeth", "claws", "forward-eyes"], "carnivore"),
        Rule::new(["mammal", "hooves"], "ungulate"),
        Rule::new(["mammal", "ruminates"], "ungulate"),
        Rule::new(["mammal", "carnivore", "tawny", "dark-spots"], "leopard"),
        Rule::new(["mammal", "carnivore", "tawny", "black-stripes"], "tiger"),
        Rule::new(["ungulate", "long-neck", "long-legs", "dark-spots"], "giraffe"),
        Rule::new(["ungulate", "black-stripes"], "zebra"),
        Rule::new(
            ["bird", "long-neck", "long-legs", "black-and-white", "cannot-fly"],
            "ostrich",
        ),
        Rule::new(["bird", "swims", "black-and-white", "cannot-fly"], "penguin"),
        Rule::new(["bird", "good-flyer"], "albatross"),
    ]
}
