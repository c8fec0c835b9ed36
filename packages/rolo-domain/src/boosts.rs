use serde::{Deserialize, Serialize};

/// Why the user is searching. Drives the role-affinity boost; `Any` applies no
/// purpose boost at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
	#[default]
	Any,
	RaiseFunds,
	HireTalent,
	FindMentors,
	ExplorePartnerships,
	GetAdvice,
}

pub struct PurposeAffinity {
	pub position_keywords: &'static [&'static str],
	pub company_keywords: &'static [&'static str],
}

/// Title fragments and their weights, most senior first. The scan stops at the
/// first hit, so entries that are substrings of other entries ("vice
/// president" vs "president") must appear before them.
pub const SENIORITY_WEIGHTS: &[(&str, f32)] = &[
	("founder", 15.0),
	("ceo", 15.0),
	("cto", 13.0),
	("cfo", 13.0),
	("coo", 13.0),
	("partner", 12.0),
	("managing director", 11.0),
	("vice president", 10.0),
	("vp", 10.0),
	("head", 8.0),
	("director", 7.0),
	("principal", 6.0),
	("lead", 5.0),
	("manager", 5.0),
	("senior", 4.0),
	("staff", 3.0),
];

const PRESTIGE_COMPANIES: &[&str] = &[
	"a16z",
	"accel",
	"airbnb",
	"amazon",
	"andreessen",
	"apple",
	"bain",
	"bcg",
	"benchmark",
	"bessemer",
	"deepmind",
	"goldman",
	"google",
	"greylock",
	"index ventures",
	"kleiner",
	"lightspeed",
	"mckinsey",
	"meta",
	"microsoft",
	"netflix",
	"nvidia",
	"openai",
	"sequoia",
	"stripe",
	"y combinator",
];

pub fn purpose_affinity(purpose: Purpose) -> Option<PurposeAffinity> {
	match purpose {
		Purpose::Any => None,
		Purpose::RaiseFunds => Some(PurposeAffinity {
			position_keywords: &["investor", "partner", "principal", "angel", "venture"],
			company_keywords: &["capital", "ventures", "fund", "equity", "angel"],
		}),
		Purpose::HireTalent => Some(PurposeAffinity {
			position_keywords: &["recruiter", "talent", "people", "hiring", "hr"],
			company_keywords: &["recruiting", "staffing", "talent", "search"],
		}),
		Purpose::FindMentors => Some(PurposeAffinity {
			position_keywords: &["founder", "ceo", "advisor", "mentor", "coach", "professor"],
			company_keywords: &["university", "academy"],
		}),
		Purpose::ExplorePartnerships => Some(PurposeAffinity {
			position_keywords: &["partnerships", "business development", "alliances", "sales"],
			company_keywords: &[],
		}),
		Purpose::GetAdvice => Some(PurposeAffinity {
			position_keywords: &["consultant", "advisor", "analyst", "strategist", "expert"],
			company_keywords: &["consulting", "advisory"],
		}),
	}
}

/// First (most senior) title fragment found in `position`, with its weight.
/// `position` must already be lowercased.
pub fn seniority_match(position: &str) -> Option<(&'static str, f32)> {
	if position.is_empty() {
		return None;
	}

	SENIORITY_WEIGHTS
		.iter()
		.find(|(title, _)| position.contains(title))
		.map(|(title, weight)| (*title, *weight))
}

/// Whether `company` (already lowercased) names one of the curated
/// high-signal firms.
pub fn is_prestige_company(company: &str) -> bool {
	if company.is_empty() {
		return false;
	}

	PRESTIGE_COMPANIES.iter().any(|name| company.contains(name))
}
