//! End-to-end tests of exact physical design

use fcn_layout::{GateLevelLayout, Tile, Topology};
use fcn_network::{blueprints, LogicNetwork};
use fcn_place_route::{exact, ExactParams, ExactStats, PhysicalDesignError, TechnologyConstraints};
use fcn_verify::{check_equivalence, critical_path_length_and_throughput, gate_level_drvs, DrvParams};
use std::time::Duration;

fn run(ntk: &LogicNetwork, params: &ExactParams) -> (GateLevelLayout, ExactStats) {
    let mut stats = ExactStats::default();
    let lyt = exact(ntk, params, Some(&mut stats))
        .unwrap()
        .expect("a layout should exist");
    (lyt, stats)
}

fn assert_sound(ntk: &LogicNetwork, lyt: &GateLevelLayout) {
    let drvs = gate_level_drvs(lyt, &DrvParams::default(), None);
    assert_eq!(drvs.drvs, 0, "{:?}", drvs.reports);
    let eq = check_equivalence(ntk, lyt).unwrap();
    assert!(eq.equivalent, "counterexample: {:?}", eq.counterexample);
}

#[test]
fn test_and_or_under_use() {
    let ntk = blueprints::and_or_network();
    let params = ExactParams::with_scheme("USE");
    let (lyt, stats) = run(&ntk, &params);

    assert_sound(&ntk, &lyt);
    assert_eq!(lyt.num_gates(), 2);
    assert_eq!(lyt.num_pis(), 3);
    assert_eq!(lyt.num_pos(), 1);
    assert_eq!(lyt.num_crossings(), 0);
    assert_eq!(critical_path_length_and_throughput(&lyt).throughput, 1);

    assert_eq!(stats.num_gates, 2);
    assert_eq!(stats.num_wires, lyt.num_wires());
    assert_eq!(stats.x_size, lyt.x() + 1);
    assert_eq!(stats.y_size, lyt.y() + 1);
    assert!(stats.num_vars > 0);
    assert!(stats.candidates_tried >= 1);
}

#[test]
fn test_maj_under_res() {
    let ntk = blueprints::maj1_network();
    let params = ExactParams::with_scheme("RES");
    let (lyt, _) = run(&ntk, &params);

    assert_sound(&ntk, &lyt);
    assert_eq!(lyt.num_gates(), 1);
    assert_eq!(critical_path_length_and_throughput(&lyt).throughput, 1);
}

#[test]
fn test_names_are_conserved() {
    let ntk = blueprints::maj1_network();
    let params = ExactParams::with_scheme("RES");
    let (lyt, _) = run(&ntk, &params);

    assert_eq!(lyt.layout_name(), "maj");
    assert_eq!(lyt.input_name(0), Some("a"));
    assert_eq!(lyt.input_name(1), Some("b"));
    assert_eq!(lyt.input_name(2), Some("c"));
    assert_eq!(lyt.output_name(0), Some("f"));
}

#[test]
fn test_high_degree_fanin_is_rejected() {
    let ntk = blueprints::maj1_network();
    for scheme in ["2DDWave", "USE"] {
        let params = ExactParams::with_scheme(scheme);
        let err = exact(&ntk, &params, None).unwrap_err();
        assert!(
            matches!(err, PhysicalDesignError::HighDegreeFanin { fanin: 3, max: 2, .. }),
            "{}: {}",
            scheme,
            err
        );
    }

    let topolinano = ExactParams {
        scheme: "RES".into(),
        technology_specifics: Some(TechnologyConstraints::Topolinano),
        ..Default::default()
    };
    assert!(matches!(
        exact(&ntk, &topolinano, None),
        Err(PhysicalDesignError::HighDegreeFanin { .. })
    ));
}

#[test]
fn test_unknown_scheme_is_rejected() {
    let ntk = blueprints::and_or_network();
    let params = ExactParams::with_scheme("NOPE");
    assert!(matches!(
        exact(&ntk, &params, None),
        Err(PhysicalDesignError::UnknownClockingScheme(name)) if name == "NOPE"
    ));
}

#[test]
fn test_empty_network_is_rejected() {
    let ntk = LogicNetwork::new("empty");
    assert!(matches!(
        exact(&ntk, &ExactParams::default(), None),
        Err(PhysicalDesignError::EmptyNetwork)
    ));
}

#[test]
fn test_timeout_yields_no_layout() {
    let ntk = blueprints::half_adder_network();
    let mut params = ExactParams {
        crossings: true,
        upper_bound_x: Some(5),
        upper_bound_y: Some(5),
        ..Default::default()
    };
    params.set_timeout(Some(Duration::ZERO));

    let mut stats = ExactStats::default();
    let result = exact(&ntk, &params, Some(&mut stats)).unwrap();
    assert!(result.is_none());
    assert_eq!(stats.x_size, 0);

    params.set_timeout(None);
    let (lyt, stats) = run(&ntk, &params);
    assert_sound(&ntk, &lyt);
    assert!(stats.x_size <= 5 && stats.y_size <= 5);
    // both inputs branch
    let fanouts = lyt
        .ground_coordinates()
        .filter(|t| lyt.is_fanout_tile(t))
        .count();
    assert_eq!(fanouts, 2);
}

#[test]
fn test_results_are_deterministic() {
    let ntk = blueprints::and_or_network();
    let params = ExactParams::with_scheme("USE");
    let (first, first_stats) = run(&ntk, &params);
    let (second, second_stats) = run(&ntk, &params);
    assert_eq!(first.occupied_tiles(), second.occupied_tiles());
    assert_eq!(first_stats.num_wires, second_stats.num_wires);

    let threaded = ExactParams {
        num_threads: 3,
        ..params
    };
    let (third, third_stats) = run(&ntk, &threaded);
    assert_eq!((third_stats.x_size, third_stats.y_size), (first_stats.x_size, first_stats.y_size));
    assert_eq!(third.num_gates(), first.num_gates());
    assert_eq!(third.num_wires(), first.num_wires());
    assert_eq!(
        critical_path_length_and_throughput(&third).throughput,
        critical_path_length_and_throughput(&first).throughput
    );
}

#[test]
fn test_straight_inverters() {
    let ntk = blueprints::inverter_network();
    let params = ExactParams {
        straight_inverters: true,
        ..Default::default()
    };
    let (lyt, _) = run(&ntk, &params);
    assert_sound(&ntk, &lyt);

    let inverters: Vec<Tile> = lyt
        .ground_coordinates()
        .filter(|t| lyt.is_inv_tile(t))
        .collect();
    assert_eq!(inverters.len(), 1);
    assert!(lyt.has_opposite_incoming_and_outgoing_signals(&inverters[0]));
}

#[test]
fn test_border_io() {
    let ntk = blueprints::and_or_network();
    let params = ExactParams {
        crossings: true,
        border_io: true,
        ..ExactParams::with_scheme("2DDWave")
    };
    let (lyt, _) = run(&ntk, &params);
    assert_sound(&ntk, &lyt);
    assert_eq!(lyt.num_pis(), 3);
    for t in lyt.pis().iter().chain(lyt.pos().iter()) {
        assert!(lyt.is_at_any_border(t), "{} is not on the border", t);
    }
}

#[test]
fn test_border_io_without_crossings() {
    // border inputs sit on different diagonals, so the paths stay unbalanced
    let ntk = blueprints::and_or_network();
    let params = ExactParams {
        border_io: true,
        ..Default::default()
    };
    let (lyt, _) = run(&ntk, &params);
    assert_sound(&ntk, &lyt);
    assert_eq!(lyt.num_crossings(), 0);
    for t in lyt.pis().iter().chain(lyt.pos().iter()) {
        assert!(lyt.is_at_any_border(t), "{} is not on the border", t);
    }
}

#[test]
fn test_open_scheme_assigns_clocks() {
    let ntk = blueprints::and_or_network();
    let params = ExactParams::with_scheme("Open");
    let (lyt, _) = run(&ntk, &params);
    assert_sound(&ntk, &lyt);
    assert_eq!(critical_path_length_and_throughput(&lyt).throughput, 1);
}

#[test]
fn test_minimized_wires_do_not_grow() {
    let ntk = blueprints::and_or_network();
    let plain = ExactParams::with_scheme("USE");
    let minimized = ExactParams {
        minimize_wires: true,
        ..plain.clone()
    };
    let (lyt, stats) = run(&ntk, &minimized);
    let (_, plain_stats) = run(&ntk, &plain);

    assert_sound(&ntk, &lyt);
    assert_eq!((stats.x_size, stats.y_size), (plain_stats.x_size, plain_stats.y_size));
    assert!(stats.num_wires <= plain_stats.num_wires);
}

#[test]
fn test_synchronization_elements_with_border_io() {
    let ntk = blueprints::unbalanced_and_inv_network();
    let params = ExactParams {
        border_io: true,
        synchronization_elements: true,
        ..ExactParams::with_scheme("USE")
    };
    let (lyt, _) = run(&ntk, &params);
    assert_sound(&ntk, &lyt);
    for t in lyt.pis().iter().chain(lyt.pos().iter()) {
        assert!(lyt.is_at_any_border(t), "{} is not on the border", t);
    }
    assert_eq!(critical_path_length_and_throughput(&lyt).throughput, 1);
}

#[test]
fn test_global_synchronization() {
    let ntk = blueprints::one_to_five_path_difference_network();
    let synchronized = ExactParams::with_scheme("USE");
    let (lyt, sync_stats) = run(&ntk, &synchronized);
    assert_sound(&ntk, &lyt);
    assert_eq!(critical_path_length_and_throughput(&lyt).throughput, 1);

    // the fewest wires leave the short operand path unpadded
    let desynchronized = ExactParams {
        desynchronize: true,
        minimize_wires: true,
        ..synchronized
    };
    let (lyt, desync_stats) = run(&ntk, &desynchronized);
    assert_sound(&ntk, &lyt);
    assert_eq!(critical_path_length_and_throughput(&lyt).throughput, 2);
    assert!(desync_stats.x_size * desync_stats.y_size <= sync_stats.x_size * sync_stats.y_size);
}

#[test]
fn test_minimize_crossings_under_res() {
    let ntk = blueprints::one_to_five_path_difference_network();
    let plain = ExactParams {
        crossings: true,
        ..ExactParams::with_scheme("RES")
    };
    let minimized = ExactParams {
        minimize_crossings: true,
        ..plain.clone()
    };
    let (_, plain_stats) = run(&ntk, &plain);
    let (lyt, stats) = run(&ntk, &minimized);

    assert_sound(&ntk, &lyt);
    assert_eq!((stats.x_size, stats.y_size), (plain_stats.x_size, plain_stats.y_size));
    assert!(stats.num_crossings <= plain_stats.num_crossings);
    assert_eq!(stats.num_crossings, lyt.num_crossings());
    assert_eq!(critical_path_length_and_throughput(&lyt).throughput, 1);
}

#[test]
fn test_timeout_during_solving() {
    let ntk = blueprints::half_adder_network();
    let mut params = ExactParams {
        crossings: true,
        minimize_wires: true,
        ..ExactParams::with_scheme("USE")
    };
    params.set_timeout(Some(Duration::from_millis(1)));

    let mut stats = ExactStats::default();
    let result = exact(&ntk, &params, Some(&mut stats)).unwrap();
    assert!(result.is_none());
    assert_eq!(stats.x_size, 0);
    assert_eq!(stats.num_gates, 0);
}

#[test]
fn test_params_from_toml() {
    let params: ExactParams = toml::from_str(
        r#"
        scheme = "RES"
        crossings = true
        num_threads = 4
        timeout = 2.5
        technology_specifics = "TOPOLINANO"
        "#,
    )
    .unwrap();
    assert_eq!(params.scheme, "RES");
    assert!(params.crossings);
    assert!(!params.border_io);
    assert_eq!(params.num_threads, 4);
    assert_eq!(params.timeout_duration(), Some(Duration::from_millis(2500)));
    assert_eq!(params.technology_specifics, Some(TechnologyConstraints::Topolinano));
}
