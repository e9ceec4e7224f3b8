use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use psinfo::process::{StatusDir, StatusSource};
use psinfo::{Config, Manager, OutputFormat, ReadError, Record};
use tempfile::TempDir;

fn fake_proc(pids: &[u32]) -> TempDir {
    let temp = TempDir::new().unwrap();
    for &pid in pids {
        write_status(temp.path(), pid);
    }
    temp
}

fn write_status(root: &Path, pid: u32) {
    let dir = root.join(pid.to_string());
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("status"),
        format!(
            "Name:\tproc{pid}\nState:\tS (sleeping)\nVmSize:\t  {size} kB\nVmData:\t  10 kB\n\
             VmStk:\t  132 kB\nVmExe:\t  4 kB\nvoluntary_ctxt_switches:\t{pid}\n\
             nonvoluntary_ctxt_switches:\t1\n",
            size = pid * 100,
        ),
    )
    .unwrap();
}

fn manager_for(root: &Path, capacity: usize) -> Manager {
    Manager::new(Config {
        capacity,
        proc_root: Some(root.to_path_buf()),
        format: OutputFormat::Human,
    })
    .unwrap()
}

fn reported_pids(text: &str) -> Vec<u32> {
    text.lines()
        .filter_map(|l| l.strip_prefix("PID: "))
        .map(|p| p.trim().parse().unwrap())
        .collect()
}

#[test]
fn three_pids_three_slots() {
    let pids = [101, 102, 103];
    let proc_root = fake_proc(&pids);
    let manager = manager_for(proc_root.path(), 3);

    let mut out = Vec::new();
    let summary = manager.run(&pids, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    let mut seen = reported_pids(&text);
    seen.sort_unstable();
    assert_eq!(seen, pids);
    assert_eq!(summary.reported, 3);
    assert_eq!(summary.failed, 0);
    assert!(text.contains("Name: proc102"));
    assert!(text.contains("Total image size: 10300 kB"));
}

#[test]
fn ten_pids_never_exceed_three_outstanding() {
    let pids: Vec<u32> = (1..=10).collect();
    let proc_root = fake_proc(&pids);
    let manager = manager_for(proc_root.path(), 3);

    let mut out = Vec::new();
    let summary = manager.run(&pids, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    let seen: HashSet<u32> = reported_pids(&text).into_iter().collect();
    assert_eq!(seen.len(), 10);
    assert_eq!(summary.stats.capacity, 3);
    assert_eq!(summary.stats.published, 10);
    assert_eq!(summary.stats.consumed, 10);
    assert!(summary.stats.high_water <= 3);
}

#[test]
fn missing_pid_is_reported_and_others_continue() {
    let present = [201, 203, 204];
    let proc_root = fake_proc(&present);
    let manager = manager_for(proc_root.path(), 3);

    let mut out = Vec::new();
    let summary = manager.run(&[201, 202, 203, 204], &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(summary.reported, 3);
    assert_eq!(summary.failed, 1);
    assert!(text.contains("PID: 202\nError: process 202 not found"));
    for pid in present {
        assert!(text.contains(&format!("Name: proc{}", pid)));
    }
}

#[test]
fn small_pool_handles_many_workers() {
    let pids: Vec<u32> = (1000..1150).collect();
    let proc_root = fake_proc(&pids);
    let manager = manager_for(proc_root.path(), 2);

    let mut out = Vec::new();
    let summary = manager.run(&pids, &mut out).unwrap();

    assert_eq!(summary.reported, pids.len());
    assert!(summary.stats.high_water <= 2);
    assert_eq!(reported_pids(&String::from_utf8(out).unwrap()).len(), pids.len());
}

/// Finishes reads in reverse pid order.
struct Staggered;

impl StatusSource for Staggered {
    fn read(&self, pid: u32) -> Result<Record, ReadError> {
        thread::sleep(Duration::from_millis(50 * u64::from(5 - pid)));
        Ok(Record {
            pid,
            ..Record::default()
        })
    }
}

#[test]
fn output_follows_completion_order() {
    let manager = Manager::with_source(Config::default(), Box::new(Staggered));

    let mut out = Vec::new();
    manager.run(&[1, 2, 3, 4], &mut out).unwrap();

    let seen = reported_pids(&String::from_utf8(out).unwrap());
    assert_eq!(seen, vec![4, 3, 2, 1]);
}

#[test]
fn json_output_has_one_line_per_pid() {
    let pids = [301, 302];
    let proc_root = fake_proc(&pids);
    let manager = Manager::new(Config {
        capacity: 3,
        proc_root: Some(proc_root.path().to_path_buf()),
        format: OutputFormat::Json,
    })
    .unwrap();

    let mut out = Vec::new();
    manager.run(&[301, 302, 399], &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    let values: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(values.len(), 3);
    assert_eq!(values.iter().filter(|v| v.get("error").is_some()).count(), 1);
}

#[test]
fn non_utf8_process_name_is_still_reported() {
    let proc_root = fake_proc(&[401]);
    let dir = proc_root.path().join("402");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("status"),
        b"Name:\tbad\xff\xfename\nState:\tS (sleeping)\nVmSize:\t  700 kB\n",
    )
    .unwrap();
    let manager = manager_for(proc_root.path(), 3);

    let mut out = Vec::new();
    let summary = manager.run(&[401, 402], &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(summary.reported, 2);
    assert_eq!(summary.failed, 0);
    assert!(text.contains("Name: bad\u{fffd}\u{fffd}name"));
    assert!(text.contains("Total image size: 700 kB"));
    let plain = StatusDir::new(proc_root.path()).read(401).unwrap();
    assert_eq!(plain.voluntary_ctxt_switches, 401);
}
