use crate::point::{Point, Weighted, WeightedCluster};
use crate::shape::Shape;
use log::trace;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Collapse repeated points into `(point, count)` pairs, in first-seen order.
pub fn fold_duplicates<T: Point>(points: &[T]) -> Vec<Weighted<T>> {
    let mut index: HashMap<T::Key, usize> = HashMap::new();
    let mut folded: Vec<Weighted<T>> = Vec::new();

    for &point in points {
        match index.entry(point.key()) {
            Entry::Occupied(slot) => folded[*slot.get()].count += 1,
            Entry::Vacant(slot) => {
                slot.insert(folded.len());
                folded.push(Weighted::new(point, 1));
            }
        }
    }

    folded
}

/// Sum the counts of clusters that converged to bit-identical centroids,
/// keeping first-seen order.
pub fn fold_clusters<T: Point>(clusters: Vec<WeightedCluster<T>>) -> Vec<WeightedCluster<T>> {
    let mut index: HashMap<T::Key, usize> = HashMap::with_capacity(clusters.len());
    let mut folded: Vec<WeightedCluster<T>> = Vec::with_capacity(clusters.len());

    for cluster in clusters {
        match index.entry(cluster.centroid.key()) {
            Entry::Occupied(slot) => folded[*slot.get()].count += cluster.count,
            Entry::Vacant(slot) => {
                slot.insert(folded.len());
                folded.push(cluster);
            }
        }
    }

    folded
}

/// Single pass of the connected-components merge.
///
/// Two clusters are connected when their squared distance is below
/// `tolerance`. Each cluster joins every component it touches; components it
/// bridges are united into the earliest one. Each component then collapses to
/// the count-weighted average of its members, carrying the summed count.
pub fn connect_components<T, S>(
    clusters: &[WeightedCluster<T>],
    shape: &S,
    tolerance: f64,
) -> Vec<WeightedCluster<T>>
where
    T: Point,
    S: Shape<T>,
{
    let mut components: Vec<Vec<WeightedCluster<T>>> = Vec::with_capacity(clusters.len());
    let mut touching: Vec<usize> = Vec::new();

    for cluster in clusters {
        touching.clear();
        for (i, component) in components.iter().enumerate() {
            let connected = component
                .iter()
                .any(|member| {
                    shape.distance_squared(&member.centroid, &cluster.centroid) < tolerance
                });
            if connected {
                touching.push(i);
            }
        }

        match touching.split_first() {
            None => components.push(vec![*cluster]),
            Some((&first, rest)) => {
                // rest is ascending, remove from the back so indices stay valid
                for &i in rest.iter().rev() {
                    let absorbed = components.remove(i);
                    components[first].extend(absorbed);
                }
                components[first].push(*cluster);
            }
        }
    }

    components
        .into_iter()
        .map(|members| collapse(&members, shape))
        .collect()
}

fn collapse<T: Point, S: Shape<T>>(
    members: &[WeightedCluster<T>],
    shape: &S,
) -> WeightedCluster<T> {
    if let [single] = members {
        return *single;
    }

    let count: usize = members.iter().map(|m| m.count).sum();
    let centroid = if count == 0 {
        let centroids: Vec<T> = members.iter().map(|m| m.centroid).collect();
        shape.average(&centroids)
    } else {
        let weighted: Vec<(T, f64)> = members
            .iter()
            .map(|m| (m.centroid, m.count as f64))
            .collect();
        shape.weighted_average(&weighted)
    };

    WeightedCluster::new(centroid, count)
}

/// Post-process converged clusters into the final result.
///
/// Folds identical centroids, repeats the connected-components merge until a
/// pass merges nothing, then sorts by descending count. No two returned
/// centroids lie within `tolerance` of each other, so merging the output
/// again returns it unchanged.
pub fn merge_converged<T, S>(
    clusters: Vec<WeightedCluster<T>>,
    shape: &S,
    tolerance: f64,
) -> Vec<WeightedCluster<T>>
where
    T: Point,
    S: Shape<T>,
{
    let mut merged = fold_clusters(clusters);
    loop {
        let before = merged.len();
        merged = connect_components(&merged, shape, tolerance);
        trace!("Connected components pass: {} -> {}", before, merged.len());
        if merged.len() == before {
            break;
        }
    }

    merged.sort_by(|a, b| b.count.cmp(&a.count));
    merged
}
