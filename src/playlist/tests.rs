use super::Playlist;
use crate::library::{Track, TrackId};
use std::time::Duration;

fn tracks(names: &[&str]) -> Vec<Track> {
    names
        .iter()
        .map(|n| Track::new(format!("/tmp/{n}.mp3"), *n))
        .collect()
}

fn names(p: &Playlist) -> Vec<&str> {
    p.tracks().iter().map(|t| t.name.as_str()).collect()
}

fn current_name(p: &Playlist) -> Option<&str> {
    p.current_track().map(|t| t.name.as_str())
}

fn id_of(p: &Playlist, name: &str) -> TrackId {
    p.tracks().iter().find(|t| t.name == name).unwrap().id
}

#[test]
fn empty_playlist_has_no_current() {
    let p = Playlist::default();
    assert!(p.is_empty());
    assert_eq!(p.current_index(), None);
    assert_eq!(p.next_index(false), None);
    assert_eq!(p.prev_index(), None);
    assert!(!p.is_last());
}

#[test]
fn set_tracks_resets_pointer() {
    let mut p = Playlist::new(tracks(&["a", "b", "c"]));
    assert!(p.select(2));
    p.set_tracks(tracks(&["x", "y"]));
    assert_eq!(p.current_index(), Some(0));
    assert_eq!(current_name(&p), Some("x"));
}

#[test]
fn select_rejects_out_of_range() {
    let mut p = Playlist::new(tracks(&["a", "b"]));
    assert!(!p.select(2));
    assert_eq!(p.current_index(), Some(0));
}

#[test]
fn removing_an_earlier_entry_keeps_current_track() {
    let mut p = Playlist::new(tracks(&["a", "b", "c", "d"]));
    p.select(2);
    let a = id_of(&p, "a");
    assert!(p.remove(a).is_some());
    assert_eq!(current_name(&p), Some("c"));
    assert_eq!(p.current_index(), Some(1));
}

#[test]
fn removing_a_later_entry_keeps_current_track() {
    let mut p = Playlist::new(tracks(&["a", "b", "c"]));
    p.select(1);
    let c = id_of(&p, "c");
    p.remove(c);
    assert_eq!(current_name(&p), Some("b"));
}

#[test]
fn removing_the_current_last_entry_clamps() {
    let mut p = Playlist::new(tracks(&["a", "b", "c"]));
    p.select(2);
    let c = id_of(&p, "c");
    p.remove(c);
    assert_eq!(p.current_index(), Some(1));
    assert_eq!(current_name(&p), Some("b"));
}

#[test]
fn removing_everything_leaves_no_current() {
    let mut p = Playlist::new(tracks(&["a"]));
    let a = id_of(&p, "a");
    assert!(p.remove(a).is_some());
    assert!(p.remove(a).is_none());
    assert_eq!(p.current_index(), None);
}

#[test]
fn reorder_tracks_current_identity_across_moves() {
    let mut p = Playlist::new(tracks(&["a", "b", "c", "d"]));
    p.select(1); // b

    // Move a later entry in front of the current one.
    assert!(p.reorder(3, 0));
    assert_eq!(names(&p), vec!["d", "a", "b", "c"]);
    assert_eq!(current_name(&p), Some("b"));
    assert_eq!(p.current_index(), Some(2));

    // Move an earlier entry behind it.
    assert!(p.reorder(0, 3));
    assert_eq!(names(&p), vec!["a", "b", "c", "d"]);
    assert_eq!(p.current_index(), Some(1));

    // Move the current entry itself.
    assert!(p.reorder(1, 3));
    assert_eq!(names(&p), vec!["a", "c", "d", "b"]);
    assert_eq!(p.current_index(), Some(3));

    assert!(!p.reorder(0, 4));
    assert_eq!(names(&p), vec!["a", "c", "d", "b"]);
}

#[test]
fn mixed_edits_keep_pointer_on_same_track() {
    let mut p = Playlist::new(tracks(&["a", "b", "c"]));
    p.select(1);
    p.add_tracks(tracks(&["d", "e"]));
    p.reorder(4, 0);
    let a = id_of(&p, "a");
    p.remove(a);
    p.reorder(0, 3);
    assert_eq!(current_name(&p), Some("b"));
}

#[test]
fn linear_successor_and_predecessor_wrap() {
    let mut p = Playlist::new(tracks(&["a", "b", "c"]));
    assert_eq!(p.next_index(false), Some(1));
    assert_eq!(p.prev_index(), Some(2));
    p.select(2);
    assert!(p.is_last());
    assert_eq!(p.next_index(false), Some(0));
    assert_eq!(p.prev_index(), Some(1));
}

#[test]
fn shuffled_successor_stays_in_range() {
    let p = Playlist::new(tracks(&["a", "b", "c", "d"]));
    for _ in 0..200 {
        let i = p.next_index(true).unwrap();
        assert!(i < p.len());
    }
}

#[test]
fn set_duration_updates_by_id() {
    let mut p = Playlist::new(tracks(&["a", "b"]));
    let b = id_of(&p, "b");
    assert!(p.set_duration(b, Duration::from_secs(42)));
    assert_eq!(p.get(1).unwrap().duration, Duration::from_secs(42));

    p.remove(b);
    assert!(!p.set_duration(b, Duration::from_secs(1)));
}
