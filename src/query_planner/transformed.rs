#[derive(Debug, PartialEq, Clone)]
pub enum Transformed<T> {
    Yes(T),
    No(T),
}

impl<T> Transformed<T> {
    pub fn get_plan(self) -> T {
        match self {
            Transformed::Yes(plan) | Transformed::No(plan) => plan,
        }
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, Transformed::Yes(_))
    }

    /// Apply `f` to the carried value, keeping the Yes/No marker.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Transformed<U> {
        match self {
            Transformed::Yes(t) => Transformed::Yes(f(t)),
            Transformed::No(t) => Transformed::No(f(t)),
        }
    }
}
