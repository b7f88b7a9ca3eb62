/// How a reconciliation run ended when nothing went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The record already holds the observed address.
    Unchanged { ip: String },
    Updated { old: String, new: String },
    /// An update was due but only logged.
    DryRun { old: String, new: String },
}

impl Outcome {
    pub fn changed(&self) -> bool {
        !matches!(self, Outcome::Unchanged { .. })
    }
}
