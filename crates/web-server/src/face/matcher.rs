use crate::db::model::FaceEncoding;

pub const DEFAULT_TOLERANCE: f64 = 0.5;

/// The stored face nearest to a query face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub index: usize,
    pub distance: f64,
}

/// Finds the nearest of `known` to `face`, accepting it only when the distance
/// is within `tolerance`. Ties go to the earliest entry.
pub fn nearest<'a, I>(known: I, face: &FaceEncoding, tolerance: f64) -> Option<Match>
where
    I: IntoIterator<Item = &'a FaceEncoding>,
{
    known
        .into_iter()
        .enumerate()
        .fold(None, |best: Option<Match>, (index, known_face)| {
            let distance = known_face.distance(face);
            match best {
                Some(best) if best.distance <= distance => Some(best),
                _ => Some(Match { index, distance }),
            }
        })
        .filter(|best| best.distance <= tolerance)
}

/// Matches every detected face against the known ones. Unmatched faces are
/// dropped; one face never yields more than one match.
pub fn match_faces(known: &[&FaceEncoding], faces: &[FaceEncoding], tolerance: f64) -> Vec<Match> {
    faces
        .iter()
        .enumerate()
        .filter_map(|(i, face)| {
            let best = nearest(known.iter().copied(), face, tolerance);
            match best {
                Some(best) => log::debug!("  FACE {} MATCHED {} @ {}", i, best.index, best.distance),
                None => log::debug!("  FACE {} NOT RECOGNISED", i),
            }
            best
        })
        .collect()
}
