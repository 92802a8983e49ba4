//! Normalization over device-shaped documents.

use netauto_diff::{config_diff, normalize};
use pretty_assertions::assert_eq;

const RUNNING: &str = r#"<data xmlns="urn:ietf:params:xml:ns:netconf:base:1.0">
    <interfaces xmlns="http://www.ipinfusion.com/yang/ocnos/ipi-interface">
        <interface>
            <name>eth3</name>
            <config><name>eth3</name><mtu>1500</mtu></config>
        </interface>
    </interfaces>
    <nacm xmlns="urn:ietf:params:xml:n s:yang:ietf-netconf-acm"></nacm>
</data>"#;

const CANDIDATE: &str = r#"<data xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"><interfaces xmlns="http://www.ipinfusion.com/yang/ocnos/ipi-interface"><interface><name>eth3</name><config><name>eth3</name><mtu>9000</mtu><description>uplink &amp; core</description></config></interface></interfaces><nacm xmlns="urn:ietf:params:xml:ns:yang:ietf-netconf-acm"/></data>"#;

#[test]
fn test_normalize_is_idempotent() {
    for doc in [RUNNING, CANDIDATE] {
        let once = normalize(doc).unwrap();
        let twice = normalize(&once).unwrap();
        assert_eq!(once, twice);
    }
}

#[test]
fn test_mixed_content_is_idempotent() {
    let doc = "<a>lead<b>x</b>tail</a>";
    let once = normalize(doc).unwrap();
    assert_eq!(normalize(&once).unwrap(), once);
}

#[test]
fn test_diff_reports_only_semantic_changes() {
    let diff = config_diff(RUNNING, CANDIDATE).unwrap();
    let changed: Vec<&str> = diff
        .lines()
        .filter(|l| (l.starts_with('+') || l.starts_with('-')) && !l.starts_with("+++") && !l.starts_with("---"))
        .collect();
    assert_eq!(
        changed,
        vec![
            "-        <mtu>1500</mtu>",
            "+        <mtu>9000</mtu>",
            "+        <description>uplink &amp; core</description>",
        ]
    );
    assert!(diff.starts_with("--- running-config\n+++ candidate-config\n"));
}
