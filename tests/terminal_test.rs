/*!
Tests reading options files and running the terminal entry point.
 */

mod common;
use std::fs;
use std::io::Write;
use dragonfly_lib::address::address_ranges;
use dragonfly_lib::config::{DragonflyOptions, MemorySize, OverflowPolicy};
use dragonfly_lib::error::ErrorKind;
use dragonfly_lib::{terminal_main, terminal_run, write_address_map, write_summary};
use common::*;

const OPTIONS: &str = "num_cpus: 18
routers_per_group: 2
global_channels_per_router: 4
link_latency: 2
mem_size: 1GiB
num_dirs: 18
num_dmas: 1
overflow_policy: DmaOnly
";

fn args(list: &[&str]) -> Vec<String>
{
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn options_from_file()
{
    let mut file = tempfile::NamedTempFile::new().expect("temporary file");
    file.write_all(OPTIONS.as_bytes()).expect("writable");
    let options = DragonflyOptions::from_file(file.path()).expect("valid options");
    assert_eq!(options.num_cpus, 18);
    assert_eq!(options.global_link_latency(), 2);
    assert_eq!(options.mem_size.bytes(), 1 << 30);
    assert_eq!(options.overflow_policy, OverflowPolicy::DmaOnly);
    assert_eq!(options.controllers().len(), 37);
}

#[test]
fn missing_file()
{
    let dir = tempfile::tempdir().expect("temporary directory");
    let error = DragonflyOptions::from_file(&dir.path().join("absent.yaml")).expect_err("there is no file");
    assert!(matches!(error.kind, ErrorKind::CouldNotOpenFile { .. }));
}

#[test]
fn terminal_writes_adjacencies()
{
    let dir = tempfile::tempdir().expect("temporary directory");
    let config = dir.path().join("dragonfly.yaml");
    fs::write(&config, OPTIONS).expect("writable");
    let output = dir.path().join("network.txt");
    terminal_main(&args(&[
        "dragonfly",
        "--config", config.to_str().expect("utf8 path"),
        "--format", "adjacency",
        "--output", output.to_str().expect("utf8 path"),
    ])).expect("the terminal run should succeed");
    let text = fs::read_to_string(&output).expect("output written");
    assert!(text.starts_with("NODOS 18\nGRADO 5\n"), "{}", text);
}

#[test]
fn command_line_overrides_the_file()
{
    let dir = tempfile::tempdir().expect("temporary directory");
    let config = dir.path().join("dragonfly.yaml");
    fs::write(&config, OPTIONS).expect("writable");
    let output = dir.path().join("network.yaml");
    // 19 routers do not make a canonical dragonfly.
    let result = terminal_main(&args(&[
        "dragonfly",
        "--config", config.to_str().expect("utf8 path"),
        "--num_cpus", "19",
        "--output", output.to_str().expect("utf8 path"),
    ]));
    let error = result.expect_err("19 routers is not a canonical size");
    assert!(matches!(error.kind, ErrorKind::SizingMismatch { num_routers: 19, .. }));
    assert!(!output.exists());
    let result = terminal_main(&args(&["dragonfly", "--num_cpus", "many"]));
    assert!(matches!(result.map_err(|e| e.kind), Err(ErrorKind::BadArgument { .. })));
}

#[test]
fn yaml_output()
{
    let dir = tempfile::tempdir().expect("temporary directory");
    let output = dir.path().join("network.yaml");
    terminal_main(&args(&[
        "dragonfly",
        "--num_cpus", "6",
        "--routers_per_group", "2",
        "--global_channels_per_router", "1",
        "--num_dirs", "0",
        "--output", output.to_str().expect("utf8 path"),
    ])).expect("the terminal run should succeed");
    let text = fs::read_to_string(&output).expect("output written");
    assert!(text.contains("source_outport: Global0"), "{}", text);
    assert!(text.contains("destination_inport: Local0"), "{}", text);
    assert!(text.contains("number_of_groups: 3"), "{}", text);
}

#[test]
fn summary_of_a_canonical_dragonfly()
{
    let options = canonical_options(4, 2);
    let topology = build(&options, &caches(&options, 1));
    let mut buffer: Vec<u8> = vec![];
    write_summary(&mut buffer, &topology).expect("writable");
    let text = String::from_utf8(buffer).expect("utf8");
    assert!(text.contains("groups: 9\n"), "{}", text);
    assert!(text.contains("global links: 72\n"), "{}", text);
    assert!(text.contains("diameter: 3\n"), "{}", text);
    assert!(text.contains("global links between two groups: min 1 max 1\n"), "{}", text);
}

#[test]
fn address_map_lines()
{
    let layout = address_ranges(3, MemorySize(100)).expect("valid layout");
    let mut buffer: Vec<u8> = vec![];
    write_address_map(&mut buffer, &layout).expect("writable");
    let text = String::from_utf8(buffer).expect("utf8");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, vec!["router 0 [0x0, 0x21)", "router 1 [0x21, 0x42)", "router 2 [0x42, 0x63)", "unassigned 1 bytes"]);
}

/// With the topology on the standard output, the reports must not be mixed into it.
#[test]
fn reports_keep_the_topology_stream_clean()
{
    let mut output: Vec<u8> = vec![];
    let mut report: Vec<u8> = vec![];
    terminal_run(&args(&[
        "dragonfly",
        "--num_cpus", "6",
        "--routers_per_group", "2",
        "--global_channels_per_router", "1",
        "--num_dirs", "0",
        "--summary",
        "--address_map",
    ]), &mut output, &mut report).expect("the terminal run should succeed");
    let yaml: serde_yaml::Value = serde_yaml::from_slice(&output).expect("the output is plain YAML");
    assert!(yaml.get("internal_links").is_some());
    let output = String::from_utf8(output).expect("utf8");
    assert!(!output.contains("diameter"));
    let report = String::from_utf8(report).expect("utf8");
    assert!(report.contains("diameter: 3\n"), "{}", report);
    assert!(report.contains("router 5 ["), "{}", report);
    assert!(report.contains("unassigned 2 bytes"), "{}", report);
}

#[test]
fn reports_follow_a_file_output()
{
    let dir = tempfile::tempdir().expect("temporary directory");
    let path = dir.path().join("network.txt");
    let mut output: Vec<u8> = vec![];
    let mut report: Vec<u8> = vec![];
    terminal_run(&args(&[
        "dragonfly",
        "--num_cpus", "6",
        "--routers_per_group", "2",
        "--global_channels_per_router", "1",
        "--mem_size", "6kB",
        "--format", "adjacency",
        "--output", path.to_str().expect("utf8 path"),
        "--address_map",
    ]), &mut output, &mut report).expect("the terminal run should succeed");
    assert!(report.is_empty());
    let output = String::from_utf8(output).expect("utf8");
    assert!(output.starts_with("router 0 [0x0, 0x400)\n"), "{}", output);
    assert!(!output.contains("unassigned"));
    let adjacencies = fs::read_to_string(&path).expect("output written");
    assert!(adjacencies.starts_with("NODOS 6\n"));
}
