use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The gender a post is aimed at. `Any` matches everyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Any,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Any => "any",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "any" => Ok(Gender::Any),
            other => Err(format!("unknown gender '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_round_trips_through_str() {
        for g in [Gender::Male, Gender::Female, Gender::Any] {
            assert_eq!(g.as_str().parse::<Gender>().unwrap(), g);
        }
        assert!("other".parse::<Gender>().is_err());
    }
}
