//! Derangement assignment
//!
//! Pairs every buyer with a recipient by reshuffling the recipient order until
//! nobody draws themself. A uniform permutation is a derangement with
//! probability approaching 1/e, so a valid draw takes e (~2.72) attempts on
//! average.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

/// Minimum participant count for which a derangement exists
pub const MIN_PARTICIPANTS: usize = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssignError {
    #[error("at least 2 participants are required, found {0}")]
    TooFewParticipants(usize),
}

/// Rejection sampler over a fixed buyer list
#[derive(Debug, Clone)]
pub struct Assigner {
    /// Buyer names, in configuration order
    buyers: Vec<String>,
    /// recipients[i] is the buyer index assigned to buyer i
    recipients: Vec<usize>,
}

impl Assigner {
    /// Create an assigner for the given participant names.
    ///
    /// Names are expected to be unique.
    pub fn new<I, S>(names: I) -> Result<Self, AssignError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let buyers: Vec<String> = names.into_iter().map(Into::into).collect();
        if buyers.len() < MIN_PARTICIPANTS {
            return Err(AssignError::TooFewParticipants(buyers.len()));
        }

        let recipients = (0..buyers.len()).collect();
        Ok(Self { buyers, recipients })
    }

    pub fn participants(&self) -> usize {
        self.buyers.len()
    }

    /// Draw until a valid assignment comes up and return it.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Assignment {
        let draws = self.shuffle_until_valid(rng);
        let pairs = self
            .buyers
            .iter()
            .zip(&self.recipients)
            .map(|(buyer, &recipient)| (buyer.clone(), self.buyers[recipient].clone()))
            .collect();

        Assignment { pairs, draws }
    }

    /// Draw until a valid assignment comes up, keeping only the attempt count.
    pub fn count_draws<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        self.shuffle_until_valid(rng)
    }

    fn shuffle_until_valid<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let mut draws = 0;
        loop {
            self.recipients.shuffle(rng);
            draws += 1;
            if self.is_derangement() {
                return draws;
            }
        }
    }

    fn is_derangement(&self) -> bool {
        self.recipients
            .iter()
            .enumerate()
            .all(|(buyer, &recipient)| buyer != recipient)
    }
}

/// A valid buyer to recipient pairing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// (buyer, recipient) in buyer order
    pairs: Vec<(String, String)>,
    /// Shuffles taken to reach this result
    draws: usize,
}

impl Assignment {
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(buyer, recipient)| (buyer.as_str(), recipient.as_str()))
    }

    pub fn recipient_of(&self, buyer: &str) -> Option<&str> {
        self.iter()
            .find(|(candidate, _)| *candidate == buyer)
            .map(|(_, recipient)| recipient)
    }

    pub fn draws(&self) -> usize {
        self.draws
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// One "<buyer> is buying for <recipient>" line per pair
    pub fn summary_lines(&self) -> Vec<String> {
        self.iter()
            .map(|(buyer, recipient)| format!("{buyer} is buying for {recipient}"))
            .collect()
    }
}
