use netsir::acceptance::{mean_final_susceptible, AcceptanceRule, MetropolisAcceptance};
use netsir::epidemic::{simulate, simulate_with, HealthState, SirParams};
use netsir::error::NetworkError;
use netsir::generator::configuration_model;
use netsir::graph::ContactGraph;
use netsir::risk::{age_risk, AgeRiskAdjustment};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64;

use HealthState::{Infected, Recovered, Susceptible};

/// Forwards to a `Pcg64` and counts every word drawn from it.
struct CountingRng {
    inner: Pcg64,
    draws: usize,
}

impl CountingRng {
    fn new(seed: u64) -> Self {
        CountingRng {
            inner: Pcg64::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl RngCore for CountingRng {
    fn next_u32(&mut self) -> u32 {
        self.draws += 1;
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws += 1;
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws += 1;
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws += 1;
        self.inner.try_fill_bytes(dest)
    }
}

fn triangle() -> ContactGraph {
    ContactGraph::from_rows(&[vec![0, 1, 1], vec![1, 0, 1], vec![1, 1, 0]]).unwrap()
}

#[test]
fn certain_transmission_infects_whole_triangle() {
    let mut rng = Pcg64::seed_from_u64(1);
    let params = SirParams::new(1.0, 0.0, 1.0, 1);
    let initial = [Infected, Susceptible, Susceptible];
    let t = simulate(&triangle(), &[12, 34, 72], &params, Some(&initial), &mut rng).unwrap();
    assert_eq!(t.counts_at(0), Some((2, 1, 0)));
    assert_eq!(t.counts_at(1), Some((0, 3, 0)));
}

#[test]
fn infection_does_not_chain_within_a_day() {
    let path = ContactGraph::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
    let params = SirParams::new(1.0, 0.0, 1.0, 1);
    for seed in 0..10 {
        let mut rng = Pcg64::seed_from_u64(seed);
        let t = simulate(&path, &[30, 30, 30], &params, None, &mut rng).unwrap();
        assert_eq!(t.counts_at(0), Some((2, 1, 0)));
        // Node 1 is infected on day 1 but cannot reach node 2 until day 2.
        assert_eq!(t.counts_at(1), Some((1, 2, 0)));
    }
}

#[test]
fn each_contact_is_one_exposure() {
    // p_infect = 0, so every exposure costs exactly one draw.
    let params = SirParams::new(0.0, 0.0, 1.0, 1);

    let edge = ContactGraph::from_edges(2, &[(0, 1)]).unwrap();
    let mut rng = CountingRng::new(4);
    simulate(&edge, &[30, 30], &params, None, &mut rng).unwrap();
    assert_eq!(rng.draws, 1 + 1);

    let star = ContactGraph::from_edges(3, &[(0, 1), (0, 2)]).unwrap();
    let mut rng = CountingRng::new(4);
    let initial = [Susceptible, Infected, Infected];
    simulate(&star, &[30, 30, 30], &params, Some(&initial), &mut rng).unwrap();
    assert_eq!(rng.draws, 2 + 2);

    let initial = [Infected, Susceptible, Susceptible];
    let mut rng = CountingRng::new(4);
    simulate(&star, &[30, 30, 30], &params, Some(&initial), &mut rng).unwrap();
    assert_eq!(rng.draws, 2 + 1);
}

#[test]
fn zero_transmission_only_moves_infected_to_recovered() {
    for seed in 0..20 {
        let mut rng = Pcg64::seed_from_u64(seed);
        let params = SirParams::new(0.0, 0.4, 0.7, 30);
        let initial = [Infected, Susceptible, Infected];
        let t = simulate(&triangle(), &[12, 34, 72], &params, Some(&initial), &mut rng).unwrap();
        assert!(t.susceptible.iter().all(|&s| s == 1));
        for day in 1..t.len() {
            assert!(t.infected[day] <= t.infected[day - 1]);
            assert!(t.recovered[day] >= t.recovered[day - 1]);
        }
    }
}

#[test]
fn explicit_initial_state_from_flags() {
    let initial = HealthState::from_infected_flags(&[false, true, false]);
    assert_eq!(initial, vec![Susceptible, Infected, Susceptible]);
    let mut rng = Pcg64::seed_from_u64(2);
    let params = SirParams::new(0.0, 0.0, 1.0, 3);
    let t = simulate(&triangle(), &[1, 1, 1], &params, Some(&initial), &mut rng).unwrap();
    assert_eq!(t.counts_at(3), Some((2, 1, 0)));
}

#[test]
fn recovered_initial_state_is_respected() {
    let mut rng = Pcg64::seed_from_u64(2);
    let params = SirParams::new(1.0, 0.0, 1.0, 4);
    let initial = [Infected, Recovered, Susceptible];
    let path = ContactGraph::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
    let t = simulate(&path, &[1, 1, 1], &params, Some(&initial), &mut rng).unwrap();
    // The recovered individual sits between the two others and blocks the chain.
    assert!(t.susceptible.iter().all(|&s| s == 1));
}

#[test]
fn initial_state_length_is_checked() {
    let mut rng = Pcg64::seed_from_u64(0);
    let err = simulate(
        &triangle(),
        &[1, 1, 1],
        &SirParams::default(),
        Some(&[Infected, Susceptible]),
        &mut rng,
    )
    .unwrap_err();
    assert!(matches!(err, NetworkError::DimensionMismatch { .. }));
}

#[test]
fn simulation_is_deterministic_for_a_seed() {
    let degrees = [3, 6, 4, 12, 7, 4, 9, 13, 15, 16, 2, 2, 5, 4, 2, 6, 7, 8, 6, 4, 2, 5, 8, 5, 9, 10, 3, 2, 3, 3, 3];
    let ages = vec![30u32; degrees.len()];
    let mut rng = Pcg64::seed_from_u64(17);
    let graph = configuration_model(&degrees, &mut rng).unwrap();
    let params = SirParams::new(0.5, 0.2, 0.8, 50);

    let a = simulate(&graph, &ages, &params, None, &mut Pcg64::seed_from_u64(5)).unwrap();
    let b = simulate(&graph, &ages, &params, None, &mut Pcg64::seed_from_u64(5)).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), 51);
    for day in 0..a.len() {
        let (s, i, r) = a.counts_at(day).unwrap();
        assert_eq!(s + i + r, 31);
    }
}

#[test]
fn generated_graph_matches_degree_sequence_length() {
    let degrees = [3, 6, 4, 12, 7, 4, 9, 13, 15, 16, 2, 2, 5, 4, 2, 6, 7, 8, 6, 4, 2, 5, 8, 5, 9, 10, 3, 2, 3, 3, 3];
    let mut rng = Pcg64::seed_from_u64(23);
    let graph = configuration_model(&degrees, &mut rng).unwrap();
    let rows = graph.to_rows();
    assert_eq!(rows.len(), 31);
    for i in 0..31 {
        assert_eq!(rows[i].len(), 31);
        for j in 0..31 {
            assert_eq!(rows[i][j], rows[j][i]);
        }
    }
    assert_eq!(graph.degree_sequence(), degrees.to_vec());
}

#[test]
fn age_risk_brackets() {
    let ages = [2, 9, 19, 29, 39, 49, 59, 69];
    let expected = [0.025, 0.0125, -0.0125, -0.0125, -0.0125, -0.0125, -0.0125, 0.0125];
    for (&age, &want) in ages.iter().zip(expected.iter()) {
        let got = age_risk(age, 0.5, 0.5);
        assert!((got - want).abs() < 1e-12, "age {age}: got {got}, want {want}");
    }
}

#[test]
fn age_adjustment_can_enable_transmission() {
    // p_transmit * p_contact is zero, so only the child's age bonus lets the
    // infection through.
    let modifier = AgeRiskAdjustment {
        p_transmit: 1.0,
        p_recover: 1.0,
    };
    let params = SirParams::new(0.0, 0.0, 1.0, 200);
    let graph = ContactGraph::from_edges(3, &[(0, 1), (0, 2)]).unwrap();
    let mut rng = Pcg64::seed_from_u64(4);
    let t = simulate_with(&graph, &[40, 3, 40], &params, None, &modifier, &mut rng).unwrap();
    assert_eq!(t.counts_at(200), Some((1, 2, 0)));
}

#[test]
fn metropolis_returns_one_of_its_inputs() {
    let current = ContactGraph::from_edges(4, &[(0, 1), (2, 3)]).unwrap();
    let candidate = ContactGraph::from_edges(4, &[(0, 3), (2, 1)]).unwrap();
    let rule = MetropolisAcceptance::new(SirParams::new(0.5, 0.3, 0.8, 10), 25);
    let mut rng = Pcg64::seed_from_u64(6);
    for _ in 0..10 {
        let decision = rule.decide(&candidate, &current, &[1, 1, 1, 1], &mut rng).unwrap();
        assert!((0.0..=1.0).contains(&decision.alpha));
        if decision.accepted {
            assert!(std::ptr::eq(decision.graph, &candidate));
        } else {
            assert!(std::ptr::eq(decision.graph, &current));
        }
    }
}

#[test]
fn metropolis_prefers_isolating_patient_zero() {
    // In `isolated` patient zero has no contacts, so nobody else is ever infected.
    let exposed = ContactGraph::from_edges(4, &[(0, 1), (2, 3)]).unwrap();
    let isolated = ContactGraph::from_edges(4, &[(1, 2), (2, 3)]).unwrap();
    let params = SirParams::new(1.0, 0.0, 1.0, 5);
    let rule = MetropolisAcceptance::new(params, 10);
    let mut rng = Pcg64::seed_from_u64(8);
    let decision = rule.decide(&isolated, &exposed, &[1, 1, 1, 1], &mut rng).unwrap();
    assert_eq!(decision.alpha, 1.0);
    assert!(decision.accepted);
}

#[test]
fn metropolis_fails_when_current_burns_out() {
    let complete = ContactGraph::from_edges(3, &[(0, 1), (1, 2), (0, 2)]).unwrap();
    let params = SirParams::new(1.0, 0.0, 1.0, 3);
    let rule = MetropolisAcceptance::new(params, 5);
    let mut rng = Pcg64::seed_from_u64(8);
    let err = rule.decide(&complete, &complete, &[1, 1, 1], &mut rng).unwrap_err();
    assert_eq!(err, NetworkError::DegenerateAcceptance);
}

#[test]
fn mean_final_susceptible_is_reproducible() {
    let graph = ContactGraph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]).unwrap();
    let params = SirParams::new(0.6, 0.3, 0.9, 15);
    let a = mean_final_susceptible(&graph, &[1; 5], &params, 40, &mut Pcg64::seed_from_u64(3)).unwrap();
    let b = mean_final_susceptible(&graph, &[1; 5], &params, 40, &mut Pcg64::seed_from_u64(3)).unwrap();
    assert_eq!(a, b);
    assert!((0.0..=4.0).contains(&a));
}

#[test]
fn decide_accepts_any_rng() {
    let path = ContactGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]).unwrap();
    let rule = MetropolisAcceptance::new(SirParams::new(0.0, 0.5, 0.5, 5), 6);
    let mut rng = CountingRng::new(21);
    let decision = rule.decide(&path, &path, &[30; 4], &mut rng).unwrap();
    assert!(decision.accepted);
    assert_eq!(decision.alpha, 1.0);
    // One seed per trial for each graph, then the uniform draw.
    assert_eq!(rng.draws, 6 + 6 + 1);
}
