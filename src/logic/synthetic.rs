//! Synthetic Bid Generator
//!
//! Deterministic (seeded) generator of tender bids used to bootstrap a
//! training corpus, by the demo binary and by tests.
//!
//! Profiles:
//! - typical: 90-110% of the estimate, business hours on weekdays
//! - mixed: every 7th bid suspiciously low (30-60%), every 5th very high
//!   (150-200%), the rest 80-120%

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc, Weekday};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::logic::features::{BidHistory, BidRecord, FeatureExtractor, FeatureVector, TenderContext};

const COMPANIES: &[&str] = &[
    "TechSolutions Corp", "InnovateIT Ltd", "SecureCloud Systems",
    "DataDrive Technologies", "CyberSafe Solutions", "CloudFirst Inc",
    "SmartTech Partners", "DigitalEdge Corp", "NextGen Systems",
    "TechFlow Solutions", "InfoSec Dynamics", "CloudCore Technologies",
];

const TECHNOLOGIES: &[&str] = &[
    "cloud computing", "AI integration", "blockchain technology", "IoT systems", "machine learning",
];

const DOMAINS: &[&str] = &[
    "cybersecurity", "data analytics", "infrastructure management", "digital transformation", "automation",
];

const CAPABILITIES: &[&str] = &[
    "real-time monitoring", "advanced encryption", "automated deployment",
    "performance optimization", "compliance management",
];

/// Business hours used for typical submissions [start, end)
const BUSINESS_HOURS: (f64, f64) = (8.0, 18.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BidProfile {
    Typical,
    SuspiciouslyLow,
    VeryHigh,
}

/// One generated bid with the context needed to score it
#[derive(Debug, Clone)]
pub struct SyntheticBid {
    pub bid: BidRecord,
    pub history: BidHistory,
    pub profile: BidProfile,
}

pub struct SyntheticBidGenerator {
    rng: StdRng,
    tender: TenderContext,
    sequence: u64,
}

impl SyntheticBidGenerator {
    pub fn new(seed: u64) -> Self {
        let deadline = Utc
            .with_ymd_and_hms(2026, 6, 30, 17, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);

        Self::with_tender(
            seed,
            TenderContext {
                tender_id: "T-SYN-001".to_string(),
                estimated_value: 100_000.0,
                deadline,
                category: "IT Services".to_string(),
            },
        )
    }

    pub fn with_tender(seed: u64, tender: TenderContext) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            tender,
            sequence: 0,
        }
    }

    pub fn tender(&self) -> &TenderContext {
        &self.tender
    }

    /// Typical bid: amount ratio ~1.0 ± 0.1, weekday business hours
    pub fn typical(&mut self) -> SyntheticBid {
        let ratio = self.rng.gen_range(0.9..1.1);
        let at = self.business_time();
        self.build(ratio, at, BidProfile::Typical)
    }

    /// Bid `index` of a mixed batch (low / high / normal mix)
    pub fn mixed(&mut self, index: usize) -> SyntheticBid {
        let (ratio, profile) = if index % 7 == 0 {
            (self.rng.gen_range(0.3..0.6), BidProfile::SuspiciouslyLow)
        } else if index % 5 == 0 {
            (self.rng.gen_range(1.5..2.0), BidProfile::VeryHigh)
        } else {
            (self.rng.gen_range(0.8..1.2), BidProfile::Typical)
        };
        let at = self.business_time();
        self.build(ratio, at, profile)
    }

    /// Bid at an explicit ratio and time with central (median) context
    pub fn central(&mut self, ratio: f64, submitted_at: DateTime<Utc>) -> SyntheticBid {
        let estimate = self.tender.estimated_value;
        let proposal = format!(
            "We propose a comprehensive solution with 10 years of experience in {}. Our approach includes {}, {}, and {} with guaranteed delivery within timeline.",
            DOMAINS[1], CAPABILITIES[0], CAPABILITIES[1], CAPABILITIES[3]
        );
        let length = proposal.chars().count();

        let history = BidHistory {
            tender_amounts: vec![0.97 * estimate, estimate, 1.03 * estimate, estimate],
            tender_proposal_lengths: vec![length - 20, length, length + 20, length],
            bidder_submissions: (1..=2).map(|d| submitted_at - Duration::days(d * 20)).collect(),
        };

        let bid = BidRecord::new(
            self.next_bid_id(),
            self.tender.tender_id.clone(),
            COMPANIES[8],
            ratio * estimate,
            submitted_at,
        )
        .with_proposal(proposal);

        let profile = if (0.8..=1.2).contains(&ratio) {
            BidProfile::Typical
        } else if ratio < 0.8 {
            BidProfile::SuspiciouslyLow
        } else {
            BidProfile::VeryHigh
        };

        SyntheticBid { bid, history, profile }
    }

    /// Feature vectors of `count` typical bids
    pub fn typical_vectors(&mut self, extractor: &FeatureExtractor, count: usize) -> Result<Vec<FeatureVector>> {
        (0..count)
            .map(|_| {
                let s = self.typical();
                extractor.extract(&s.bid, Some(&self.tender), Some(&s.history))
            })
            .collect()
    }

    // ------------------------------------------------------------------------

    fn build(&mut self, ratio: f64, submitted_at: DateTime<Utc>, profile: BidProfile) -> SyntheticBid {
        let estimate = self.tender.estimated_value;

        let peers = self.rng.gen_range(2..6);
        let tender_amounts = (0..peers)
            .map(|_| estimate * self.rng.gen_range(0.9..1.1))
            .collect();
        let tender_proposal_lengths = (0..peers).map(|_| self.rng.gen_range(140..240)).collect();
        let bidder_submissions = (0..self.rng.gen_range(0..5))
            .map(|_| submitted_at - Duration::hours(self.rng.gen_range(1..60 * 24)))
            .collect();

        let company = COMPANIES.choose(&mut self.rng).copied().unwrap_or("Acme Ltd");
        let proposal = self.proposal();

        let bid = BidRecord::new(
            self.next_bid_id(),
            self.tender.tender_id.clone(),
            company,
            ratio * estimate,
            submitted_at,
        )
        .with_proposal(proposal);

        SyntheticBid {
            bid,
            history: BidHistory {
                tender_amounts,
                tender_proposal_lengths,
                bidder_submissions,
            },
            profile,
        }
    }

    /// Weekday, business hours, 1-15 days before the deadline
    fn business_time(&mut self) -> DateTime<Utc> {
        loop {
            let days_before = self.rng.gen_range(1..=15);
            let day = (self.tender.deadline - Duration::days(days_before)).date_naive();
            if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }

            let hour = self.rng.gen_range(BUSINESS_HOURS.0..BUSINESS_HOURS.1);
            let seconds = (hour * 3600.0) as i64;
            if let Some(midnight) = day.and_hms_opt(0, 0, 0) {
                return Utc.from_utc_datetime(&midnight) + Duration::seconds(seconds);
            }
        }
    }

    fn proposal(&mut self) -> String {
        let pick = |rng: &mut StdRng, items: &[&'static str]| items.choose(rng).copied().unwrap_or("");
        let years = self.rng.gen_range(3..=20);
        let technology = pick(&mut self.rng, TECHNOLOGIES);
        let domain = pick(&mut self.rng, DOMAINS);
        let first = pick(&mut self.rng, CAPABILITIES);
        let second = pick(&mut self.rng, CAPABILITIES);

        match self.rng.gen_range(0..3) {
            0 => format!(
                "We propose a comprehensive solution with {} years of experience in {}. Our approach includes {}, {}, and {} with guaranteed delivery within timeline.",
                years, domain, first, second, technology
            ),
            1 => format!(
                "Our company offers cutting-edge {} solutions with expertise in {}. We provide {}, {}, and 24/7 support for optimal performance.",
                technology, domain, first, second
            ),
            _ => format!(
                "We specialize in {} with proven track record of {} years. Our solution features {}, {}, and comprehensive {} implementation.",
                domain, years, technology, first, second
            ),
        }
    }

    fn next_bid_id(&mut self) -> String {
        self.sequence += 1;
        format!("SYN-{:05}", self.sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_generator_is_deterministic() {
        let mut a = SyntheticBidGenerator::new(42);
        let mut b = SyntheticBidGenerator::new(42);
        for _ in 0..10 {
            assert_eq!(a.typical().bid, b.typical().bid);
        }
    }

    #[test]
    fn test_typical_bids_stay_in_profile() {
        let mut generator = SyntheticBidGenerator::new(3);
        let estimate = generator.tender().estimated_value;

        for _ in 0..100 {
            let s = generator.typical();
            let ratio = s.bid.amount / estimate;
            assert!((0.9..1.1).contains(&ratio));
            assert!(!matches!(s.bid.submitted_at.weekday(), Weekday::Sat | Weekday::Sun));
            assert!((8..18).contains(&s.bid.submitted_at.hour()));
            assert!(s.bid.submitted_at < generator.tender().deadline);
        }
    }

    #[test]
    fn test_mixed_profiles() {
        let mut generator = SyntheticBidGenerator::new(9);
        assert_eq!(generator.mixed(0).profile, BidProfile::SuspiciouslyLow);
        assert_eq!(generator.mixed(5).profile, BidProfile::VeryHigh);
        assert_eq!(generator.mixed(1).profile, BidProfile::Typical);
    }

    #[test]
    fn test_typical_vectors_extract() {
        let mut generator = SyntheticBidGenerator::new(11);
        let vectors = generator
            .typical_vectors(&FeatureExtractor::default(), 25)
            .unwrap();
        assert_eq!(vectors.len(), 25);
        assert!(vectors.iter().all(|v| v.is_compatible()));
    }
}
