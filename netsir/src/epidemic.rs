use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{check_probability, NetworkError, Result};
use crate::graph::ContactGraph;
use crate::risk::{NoAdjustment, TransmissionModifier};

pub const DEFAULT_NUM_DAYS: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthState {
    Susceptible,
    Infected,
    Recovered,
}

impl HealthState {
    /// Individual 0 infected, everyone else susceptible.
    pub fn patient_zero(num_people: usize) -> Vec<HealthState> {
        let mut state = vec![HealthState::Susceptible; num_people];
        if let Some(first) = state.first_mut() {
            *first = HealthState::Infected;
        }
        state
    }

    /// Maps an infected/not-infected flag per individual to Infected/Susceptible.
    pub fn from_infected_flags(flags: &[bool]) -> Vec<HealthState> {
        flags
            .iter()
            .map(|&infected| {
                if infected {
                    HealthState::Infected
                } else {
                    HealthState::Susceptible
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SirParams {
    /// Chance that one contact between an infected and a susceptible transmits.
    pub p_transmit: f64,
    /// Daily chance that an infected individual recovers (or dies).
    pub p_recover: f64,
    /// Chance that two connected individuals actually meet on a given day.
    pub p_contact: f64,
    pub num_days: usize,
}

impl Default for SirParams {
    fn default() -> Self {
        SirParams {
            p_transmit: 0.5,
            p_recover: 0.2,
            p_contact: 0.8,
            num_days: DEFAULT_NUM_DAYS,
        }
    }
}

impl SirParams {
    pub fn new(p_transmit: f64, p_recover: f64, p_contact: f64, num_days: usize) -> Self {
        SirParams {
            p_transmit,
            p_recover,
            p_contact,
            num_days,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_probability("p_transmit", self.p_transmit)?;
        check_probability("p_recover", self.p_recover)?;
        check_probability("p_contact", self.p_contact)?;
        if self.num_days == 0 {
            return Err(NetworkError::InvalidParameter(
                "num_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn p_infect(&self) -> f64 {
        self.p_transmit * self.p_contact
    }
}

/// Compartment counts per day. Index 0 is the initial distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trajectory {
    pub susceptible: Vec<usize>,
    pub infected: Vec<usize>,
    pub recovered: Vec<usize>,
}

impl Trajectory {
    fn with_capacity(capacity: usize) -> Self {
        Trajectory {
            susceptible: Vec::with_capacity(capacity),
            infected: Vec::with_capacity(capacity),
            recovered: Vec::with_capacity(capacity),
        }
    }

    fn record(&mut self, state: &[HealthState]) {
        let (mut s, mut i, mut r) = (0, 0, 0);
        for h in state {
            match h {
                HealthState::Susceptible => s += 1,
                HealthState::Infected => i += 1,
                HealthState::Recovered => r += 1,
            }
        }
        self.susceptible.push(s);
        self.infected.push(i);
        self.recovered.push(r);
    }

    pub fn len(&self) -> usize {
        self.susceptible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.susceptible.is_empty()
    }

    /// `(S, I, R)` on day `t`.
    pub fn counts_at(&self, t: usize) -> Option<(usize, usize, usize)> {
        Some((
            *self.susceptible.get(t)?,
            *self.infected.get(t)?,
            *self.recovered.get(t)?,
        ))
    }

    pub fn population(&self) -> usize {
        self.counts_at(0).map(|(s, i, r)| s + i + r).unwrap_or(0)
    }

    pub fn final_susceptible(&self) -> usize {
        self.susceptible.last().copied().unwrap_or(0)
    }
}

/// Runs the SIR process on `graph` for `params.num_days` days.
///
/// Without `initial_state`, individual 0 starts infected and everyone else
/// susceptible. `ages` must line up with the graph rows even though the plain
/// engine does not read them; see [`simulate_with`] for an age-aware run.
pub fn simulate<R: Rng + ?Sized>(
    graph: &ContactGraph,
    ages: &[u32],
    params: &SirParams,
    initial_state: Option<&[HealthState]>,
    rng: &mut R,
) -> Result<Trajectory> {
    simulate_with(graph, ages, params, initial_state, &NoAdjustment, rng)
}

/// Same as [`simulate`], with `modifier` adjusting each susceptible's infection
/// probability from their age.
pub fn simulate_with<R: Rng + ?Sized>(
    graph: &ContactGraph,
    ages: &[u32],
    params: &SirParams,
    initial_state: Option<&[HealthState]>,
    modifier: &dyn TransmissionModifier,
    rng: &mut R,
) -> Result<Trajectory> {
    params.validate()?;
    let n = graph.num_nodes();
    if ages.len() != n {
        return Err(NetworkError::DimensionMismatch {
            what: "ages",
            expected: n,
            found: ages.len(),
        });
    }
    let mut state = match initial_state {
        Some(initial) if initial.len() != n => {
            return Err(NetworkError::DimensionMismatch {
                what: "initial_state",
                expected: n,
                found: initial.len(),
            });
        }
        Some(initial) => initial.to_vec(),
        None if n == 0 => {
            return Err(NetworkError::InvalidParameter(
                "cannot seed patient zero in an empty population".to_string(),
            ));
        }
        None => HealthState::patient_zero(n),
    };

    // Lower triangle only, so every contact is visited once per day.
    let contacts: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| (0..i).map(move |j| (i, j)))
        .filter(|&(i, j)| graph.has_edge(i, j))
        .collect();
    let p_infect: Vec<f64> = ages
        .iter()
        .map(|&age| modifier.adjust(age, params.p_infect()))
        .collect();

    let mut trajectory = Trajectory::with_capacity(params.num_days + 1);
    trajectory.record(&state);

    let mut exposures = vec![0usize; n];
    let mut infected_today = Vec::with_capacity(n);
    for day in 0..params.num_days {
        exposures.iter_mut().for_each(|e| *e = 0);
        for &(i, j) in &contacts {
            match (state[i], state[j]) {
                (HealthState::Susceptible, HealthState::Infected) => exposures[i] += 1,
                (HealthState::Infected, HealthState::Susceptible) => exposures[j] += 1,
                _ => {}
            }
        }

        // Recovery eligibility is fixed before anyone new is infected.
        infected_today.clear();
        infected_today.extend((0..n).filter(|&p| state[p] == HealthState::Infected));

        for person in 0..n {
            if state[person] != HealthState::Susceptible || exposures[person] == 0 {
                continue;
            }
            let threshold = p_infect[person];
            if (0..exposures[person]).any(|_| rng.gen::<f64>() < threshold) {
                state[person] = HealthState::Infected;
            }
        }

        for &person in &infected_today {
            if rng.gen::<f64>() < params.p_recover {
                state[person] = HealthState::Recovered;
            }
        }

        trajectory.record(&state);
        tracing::trace!(
            day = day + 1,
            susceptible = trajectory.final_susceptible(),
            "sir step"
        );
    }

    Ok(trajectory)
}
