//! Benchmark networks
//!
//! Small networks that exercise the interesting corners of physical design:
//! high-degree gates, fanouts, unbalanced paths and inverters.

use crate::network::LogicNetwork;

/// Names of all built-in benchmarks, in the order listed by the CLI
pub const BENCHMARKS: &[&str] = &[
    "and_or",
    "maj1",
    "half_adder",
    "inverter",
    "one_to_five_path_difference",
    "unbalanced_and_inv",
    "nand_xnor",
    "mux21",
];

/// Look up a benchmark by name
pub fn by_name(name: &str) -> Option<LogicNetwork> {
    let ntk = match name {
        "and_or" => and_or_network(),
        "maj1" => maj1_network(),
        "half_adder" => half_adder_network(),
        "inverter" => inverter_network(),
        "one_to_five_path_difference" => one_to_five_path_difference_network(),
        "unbalanced_and_inv" => unbalanced_and_inv_network(),
        "nand_xnor" => nand_xnor_network(),
        "mux21" => mux21_network(),
        _ => return None,
    };
    Some(ntk)
}

/// `f = (a & b) | c`
pub fn and_or_network() -> LogicNetwork {
    let mut ntk = LogicNetwork::new("and_or");
    let a = ntk.create_pi("a");
    let b = ntk.create_pi("b");
    let c = ntk.create_pi("c");
    let and = ntk.create_and(a, b);
    let or = ntk.create_or(and, c);
    ntk.create_po(or, "f");
    ntk
}

/// `f = MAJ(a, b, c)`
pub fn maj1_network() -> LogicNetwork {
    let mut ntk = LogicNetwork::new("maj");
    let a = ntk.create_pi("a");
    let b = ntk.create_pi("b");
    let c = ntk.create_pi("c");
    let m = ntk.create_maj(a, b, c);
    ntk.create_po(m, "f");
    ntk
}

/// `sum = a ^ b`, `carry = a & b`
pub fn half_adder_network() -> LogicNetwork {
    let mut ntk = LogicNetwork::new("half_adder");
    let a = ntk.create_pi("a");
    let b = ntk.create_pi("b");
    let sum = ntk.create_xor(a, b);
    let carry = ntk.create_and(a, b);
    ntk.create_po(sum, "sum");
    ntk.create_po(carry, "carry");
    ntk
}

/// `f = !a`
pub fn inverter_network() -> LogicNetwork {
    let mut ntk = LogicNetwork::new("inverter");
    let a = ntk.create_pi("a");
    let n = ntk.create_not(a);
    ntk.create_po(n, "f");
    ntk
}

/// An AND whose operands arrive over paths of length one and five
pub fn one_to_five_path_difference_network() -> LogicNetwork {
    let mut ntk = LogicNetwork::new("one_to_five_path_difference");
    let a = ntk.create_pi("a");
    let b = ntk.create_pi("b");
    let mut path = a;
    for _ in 0..4 {
        path = ntk.create_buf(path);
    }
    let and = ntk.create_and(path, b);
    ntk.create_po(and, "f");
    ntk
}

/// `f = a & b`, `g = !a`
pub fn unbalanced_and_inv_network() -> LogicNetwork {
    let mut ntk = LogicNetwork::new("unbalanced_and_inv");
    let a = ntk.create_pi("a");
    let b = ntk.create_pi("b");
    let and = ntk.create_and(a, b);
    let inv = ntk.create_not(a);
    ntk.create_po(and, "f");
    ntk.create_po(inv, "g");
    ntk
}

/// `f = !(a & b)`, `g = !(b ^ c)`
pub fn nand_xnor_network() -> LogicNetwork {
    let mut ntk = LogicNetwork::new("nand_xnor");
    let a = ntk.create_pi("a");
    let b = ntk.create_pi("b");
    let c = ntk.create_pi("c");
    let nand = ntk.create_nand(a, b);
    let xnor = ntk.create_xnor(b, c);
    ntk.create_po(nand, "f");
    ntk.create_po(xnor, "g");
    ntk
}

/// `f = s ? b : a`
pub fn mux21_network() -> LogicNetwork {
    let mut ntk = LogicNetwork::new("mux21");
    let a = ntk.create_pi("a");
    let b = ntk.create_pi("b");
    let s = ntk.create_pi("s");
    let ns = ntk.create_not(s);
    let lo = ntk.create_and(a, ns);
    let hi = ntk.create_and(b, s);
    let f = ntk.create_or(lo, hi);
    ntk.create_po(f, "f");
    ntk
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_benchmarks_are_valid() {
        for name in BENCHMARKS {
            let ntk = by_name(name).unwrap();
            ntk.validate().unwrap();
            assert!(ntk.num_pis() > 0, "{name} has no inputs");
            assert!(ntk.num_pos() > 0, "{name} has no outputs");
        }
        assert!(by_name("nope").is_none());
    }

    #[test]
    fn test_mux_function() {
        let ntk = mux21_network();
        for bits in 0..8u32 {
            let a = bits & 1 == 1;
            let b = bits & 2 == 2;
            let s = bits & 4 == 4;
            let out = ntk.simulate(&[a, b, s]).unwrap();
            assert_eq!(out, vec![if s { b } else { a }]);
        }
    }

    #[test]
    fn test_maj_names() {
        let ntk = maj1_network();
        assert_eq!(ntk.name(), "maj");
        let names: Vec<_> = ntk.pis().iter().filter_map(|p| ntk.node_name(*p)).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(ntk.po_name(0), Some("f"));
    }
}
