use fcn_network::blueprints;
use fcn_network::{fanout_substitution, FanoutParams, LogicNetwork};

#[test]
fn test_json_preserves_function_and_names() {
    let ntk = blueprints::mux21_network();
    let json = ntk.to_json().unwrap();
    let parsed = LogicNetwork::from_json(&json).unwrap();

    assert_eq!(parsed, ntk);
    assert_eq!(parsed.name(), "mux21");
}

#[test]
fn test_hand_written_json() {
    let json = r#"{
        "name": "xor2",
        "nodes": [
            {"kind": "pi", "name": "a"},
            {"kind": "pi", "name": "b"},
            {"kind": {"gate": "xor"}, "fanins": [0, 1]}
        ],
        "pis": [0, 1],
        "pos": [{"signal": 2, "name": "f"}]
    }"#;
    let ntk = LogicNetwork::from_json(json).unwrap();
    assert_eq!(ntk.num_pis(), 2);
    assert_eq!(ntk.simulate(&[true, false]).unwrap(), vec![true]);
}

#[test]
fn test_substituted_half_adder_is_equivalent() {
    let ntk = blueprints::half_adder_network();
    let subst = fanout_substitution(&ntk, &FanoutParams::default()).unwrap();

    // both inputs feed two gates
    assert_eq!(subst.num_gates(), ntk.num_gates() + 2);
    for bits in 0..4u32 {
        let input = [bits & 1 == 1, bits & 2 == 2];
        assert_eq!(subst.simulate(&input).unwrap(), ntk.simulate(&input).unwrap());
    }
}
