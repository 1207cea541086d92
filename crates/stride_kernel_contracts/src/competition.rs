#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::common::{validate_bounded_text, validate_positive};
use crate::{ClockValue, ContractViolation, Principal, SchemaVersion, Validate};

pub const COMPETITION_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);
pub const COMPETITION_TITLE_MAX_UNITS: usize = 100;
pub const COMPETITION_DESCRIPTION_MAX_UNITS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompetitionId(pub u64);

impl Validate for CompetitionId {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_positive("competition_id", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompetitionTitle(String);

impl CompetitionTitle {
    pub fn new(v: impl Into<String>) -> Result<Self, ContractViolation> {
        let v = v.into();
        validate_bounded_text("competition_title", &v, COMPETITION_TITLE_MAX_UNITS)?;
        Ok(Self(v))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CompetitionTitle {
    type Error = ContractViolation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CompetitionTitle> for String {
    fn from(v: CompetitionTitle) -> Self {
        v.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompetitionDescription(String);

impl CompetitionDescription {
    pub fn new(v: impl Into<String>) -> Result<Self, ContractViolation> {
        let v = v.into();
        validate_bounded_text(
            "competition_description",
            &v,
            COMPETITION_DESCRIPTION_MAX_UNITS,
        )?;
        Ok(Self(v))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CompetitionDescription {
    type Error = ContractViolation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CompetitionDescription> for String {
    fn from(v: CompetitionDescription) -> Self {
        v.0
    }
}

/// Caller-supplied arguments of `launch-competition`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitionLaunch {
    pub schema_version: SchemaVersion,
    pub title: CompetitionTitle,
    pub description: CompetitionDescription,
    pub start_clock: ClockValue,
    pub end_clock: ClockValue,
    pub required_activities: u64,
    pub minimum_session_duration: u64,
    pub reward_amount: u64,
}

impl CompetitionLaunch {
    #[allow(clippy::too_many_arguments)]
    pub fn v1(
        title: CompetitionTitle,
        description: CompetitionDescription,
        start_clock: ClockValue,
        end_clock: ClockValue,
        required_activities: u64,
        minimum_session_duration: u64,
        reward_amount: u64,
    ) -> Self {
        Self {
            schema_version: COMPETITION_CONTRACT_VERSION,
            title,
            description,
            start_clock,
            end_clock,
            required_activities,
            minimum_session_duration,
            reward_amount,
        }
    }
}

impl Validate for CompetitionLaunch {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != COMPETITION_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "competition_launch.schema_version",
                reason: "must match COMPETITION_CONTRACT_VERSION",
            });
        }
        if self.start_clock >= self.end_clock {
            return Err(ContractViolation::InvalidValue {
                field: "competition_launch.start_clock",
                reason: "must be < end_clock",
            });
        }
        validate_positive(
            "competition_launch.required_activities",
            self.required_activities,
        )?;
        validate_positive(
            "competition_launch.minimum_session_duration",
            self.minimum_session_duration,
        )?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompetitionStatus {
    NotStarted,
    Active,
    Concluded,
    Deactivated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competition {
    pub schema_version: SchemaVersion,
    pub competition_id: CompetitionId,
    pub title: CompetitionTitle,
    pub description: CompetitionDescription,
    pub organizer: Principal,
    pub start_clock: ClockValue,
    pub end_clock: ClockValue,
    pub required_activities: u64,
    pub minimum_session_duration: u64,
    pub reward_amount: u64,
    pub is_operational: bool,
}

impl Competition {
    pub fn from_launch_v1(
        competition_id: CompetitionId,
        organizer: Principal,
        launch: CompetitionLaunch,
    ) -> Result<Self, ContractViolation> {
        launch.validate()?;
        let r = Self {
            schema_version: COMPETITION_CONTRACT_VERSION,
            competition_id,
            title: launch.title,
            description: launch.description,
            organizer,
            start_clock: launch.start_clock,
            end_clock: launch.end_clock,
            required_activities: launch.required_activities,
            minimum_session_duration: launch.minimum_session_duration,
            reward_amount: launch.reward_amount,
            is_operational: true,
        };
        r.validate()?;
        Ok(r)
    }

    pub fn is_not_started_at(&self, clock: ClockValue) -> bool {
        clock < self.start_clock
    }

    pub fn is_concluded_at(&self, clock: ClockValue) -> bool {
        clock > self.end_clock
    }

    /// Enrollment window: `start <= clock <= end` on an operational competition.
    pub fn is_active_at(&self, clock: ClockValue) -> bool {
        clock >= self.start_clock && clock <= self.end_clock && self.is_operational
    }

    pub fn status_at(&self, clock: ClockValue) -> CompetitionStatus {
        if !self.is_operational {
            CompetitionStatus::Deactivated
        } else if self.is_not_started_at(clock) {
            CompetitionStatus::NotStarted
        } else if self.is_concluded_at(clock) {
            CompetitionStatus::Concluded
        } else {
            CompetitionStatus::Active
        }
    }
}

impl Validate for Competition {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != COMPETITION_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "competition.schema_version",
                reason: "must match COMPETITION_CONTRACT_VERSION",
            });
        }
        self.competition_id.validate()?;
        self.organizer.validate()?;
        if self.start_clock >= self.end_clock {
            return Err(ContractViolation::InvalidValue {
                field: "competition.start_clock",
                reason: "must be < end_clock",
            });
        }
        validate_positive("competition.required_activities", self.required_activities)?;
        validate_positive(
            "competition.minimum_session_duration",
            self.minimum_session_duration,
        )?;
        Ok(())
    }
}
