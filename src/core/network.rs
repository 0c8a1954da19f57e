use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::models::{pair_key, ConnectionEdge};
use crate::services::store::{Store, StoreError};

/// Breadth-first walker over the accumulated match graph
///
/// Walks level by level from a start user: depth 1 is their direct
/// connections, depth 2 the connections of those, and so on up to
/// `max_depth`. Each underlying match contributes exactly one edge,
/// tagged with the depth at which it was first reachable.
pub struct NetworkWalker {
    store: Arc<dyn Store>,
}

impl NetworkWalker {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Collect the connection edges reachable from `user_id` within
    /// `max_depth` hops.
    ///
    /// A user reached at some depth is never re-expanded at a deeper one
    /// (shortest depth wins), and edges are deduplicated by unordered pair
    /// so a triangle yields three edges no matter how many frontier
    /// members can see it. A frontier member whose match query fails is
    /// logged and skipped; its siblings still expand.
    pub async fn user_network(
        &self,
        user_id: &str,
        max_depth: u32,
    ) -> Result<Vec<ConnectionEdge>, StoreError> {
        let mut edges = Vec::new();
        let mut seen_pairs: HashSet<String> = HashSet::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut names: HashMap<String, String> = HashMap::new();

        visited.insert(user_id.to_string());
        let mut frontier = vec![user_id.to_string()];

        for depth in 1..=max_depth {
            if frontier.is_empty() {
                break;
            }

            let mut next_frontier = Vec::new();
            for member in &frontier {
                let matches = match self.store.matches_for_user(member).await {
                    Ok(matches) => matches,
                    Err(e) => {
                        tracing::warn!("skipping network edges for {}: {}", member, e);
                        continue;
                    }
                };

                for record in matches {
                    let key = pair_key(&record.user_a_id, &record.user_b_id);
                    if !seen_pairs.insert(key) {
                        continue;
                    }

                    let user_a_name = self.display_name(&record.user_a_id, &mut names).await;
                    let user_b_name = self.display_name(&record.user_b_id, &mut names).await;

                    edges.push(ConnectionEdge {
                        connection_id: record.id.clone(),
                        user_a_id: record.user_a_id.clone(),
                        user_b_id: record.user_b_id.clone(),
                        user_a_name,
                        user_b_name,
                        depth,
                    });

                    let other = record.other_user(member).to_string();
                    if visited.insert(other.clone()) {
                        next_frontier.push(other);
                    }
                }
            }

            frontier = next_frontier;
        }

        tracing::debug!(
            "network walk from {} found {} edges across {} users",
            user_id,
            edges.len(),
            visited.len()
        );

        Ok(edges)
    }

    /// Resolve a display name through a per-walk memo. Missing or
    /// unloadable profiles fall back to the raw id.
    async fn display_name(&self, user_id: &str, names: &mut HashMap<String, String>) -> String {
        if let Some(name) = names.get(user_id) {
            return name.clone();
        }

        let name = match self.store.get_user(user_id).await {
            Ok(Some(user)) => user.name,
            Ok(None) => user_id.to_string(),
            Err(e) => {
                tracing::debug!("name lookup failed for {}: {}", user_id, e);
                user_id.to_string()
            }
        };

        names.insert(user_id.to_string(), name.clone());
        name
    }
}
