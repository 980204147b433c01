pub const NETWORK_FILE: &str = "boston_network.json";
pub const LANDING_FILE: &str = "boston_network_landing.json";
pub const NETWORK_PREPROCESS_CMD: &str = "Rscript scripts/preprocess_network.R";

/// A named shock-propagation simulation with its own pair of datasets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scenario {
    Airports,
    Colleges,
}

impl Scenario {
    pub const ALL: [Self; 2] = [Self::Airports, Self::Colleges];

    pub fn id(self) -> &'static str {
        match self {
            Self::Airports => "airports",
            Self::Colleges => "colleges",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Airports => "Airports",
            Self::Colleges => "Colleges",
        }
    }

    pub fn note(self) -> &'static str {
        match self {
            Self::Airports => "Airports 100% closed",
            Self::Colleges => "Colleges 50% attendance",
        }
    }

    pub fn closed_file(self) -> &'static str {
        match self {
            Self::Airports => "airports_poi.json",
            Self::Colleges => "colleges_poi.json",
        }
    }

    pub fn impact_file(self) -> &'static str {
        match self {
            Self::Airports => "airports_impact.json",
            Self::Colleges => "colleges_impact.json",
        }
    }

    pub fn preprocess_cmd(self) -> &'static str {
        match self {
            Self::Airports => "Rscript scripts/preprocess_airports.R",
            Self::Colleges => "Rscript scripts/preprocess_colleges.R",
        }
    }
}
