use crate::domain::Card;

/// Parses hardcoded card tokens for fixtures and test scenarios.
pub struct CardFixtures;

impl CardFixtures {
    /// Parse hardcoded card tokens such as `["6h", "10s", "Ac"]`.
    ///
    /// Only for literal tokens known to be valid; panics otherwise.
    pub fn parse_hardcoded(tokens: &[&str]) -> Vec<Card> {
        tokens
            .iter()
            .map(|s| {
                #[allow(clippy::expect_used)]
                s.parse::<Card>().expect("hardcoded valid card token")
            })
            .collect()
    }

    /// Parse one hardcoded card token.
    pub fn card(token: &str) -> Card {
        #[allow(clippy::expect_used)]
        token.parse::<Card>().expect("hardcoded valid card token")
    }
}
