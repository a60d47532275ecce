//! Neo4j connection client.

use async_trait::async_trait;
use neo4rs::{BoltMap, BoltString, BoltType, ConfigBuilder, Graph, Query};
use serde::Deserialize;
use tracing::{debug, warn};

use congress_core::{NodeLabel, NodeRecord, PropertyMap, PropertyValue};

use crate::error::{GraphError, GraphResult};
use crate::store::{EdgeDescriptor, EdgeType, GraphStore};

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: String::new(),
            database: "neo4j".to_string(),
            max_connections: 4,
        }
    }
}

/// Client for Neo4j graph operations.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
    uri: String,
}

impl GraphClient {
    /// Create a new GraphClient from config.
    ///
    /// `Graph::connect` only builds a lazy pool, so a `RETURN 1` ping runs
    /// immediately to force a real bolt handshake. Callers wrap this in a
    /// timeout to fail fast when Neo4j is unreachable.
    pub async fn connect(config: &GraphConfig) -> GraphResult<Self> {
        let client = Self::open(config).await?;
        client.ping().await?;
        Ok(client)
    }

    /// Build the connection pool without contacting the server.
    async fn open(config: &GraphConfig) -> GraphResult<Self> {
        let neo4j_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.database.as_str())
            .max_connections(config.max_connections.max(1))
            .fetch_size(200)
            .build()
            .map_err(|e| GraphError::Config(e.to_string()))?;

        let graph = Graph::connect(neo4j_config)
            .await
            .map_err(|e| GraphError::Connection {
                uri: config.uri.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            graph,
            uri: config.uri.clone(),
        })
    }

    /// Execute a Cypher statement inside its own transaction.
    ///
    /// The transaction is rolled back if the statement fails.
    pub async fn execute_atomic(&self, query: Query) -> GraphResult<()> {
        let mut txn = self
            .graph
            .start_txn()
            .await
            .map_err(|e| GraphError::Transaction(e.to_string()))?;

        if let Err(e) = txn.run(query).await {
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            return Err(GraphError::Query(e.to_string()));
        }

        txn.commit()
            .await
            .map_err(|e| GraphError::Transaction(e.to_string()))
    }

    /// Execute a Cypher query and return results as rows.
    pub async fn query(&self, query: Query) -> GraphResult<Vec<neo4rs::Row>> {
        let mut result = self
            .graph
            .execute(query)
            .await
            .map_err(|e| GraphError::Query(e.to_string()))?;

        let mut rows = Vec::new();
        while let Some(row) = result
            .next()
            .await
            .map_err(|e| GraphError::Query(e.to_string()))?
        {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Execute a count query returning a single `count` column.
    async fn query_count(&self, query: Query) -> GraphResult<usize> {
        let rows = self.query(query).await?;
        match rows.into_iter().next() {
            Some(row) => {
                let count: i64 = row
                    .get("count")
                    .map_err(|e| GraphError::Query(format!("Failed to read count: {:?}", e)))?;
                Ok(count.max(0) as usize)
            }
            None => Ok(0),
        }
    }

}

#[async_trait]
impl GraphStore for GraphClient {
    async fn ping(&self) -> GraphResult<()> {
        self.graph
            .run(Query::new("RETURN 1".to_string()))
            .await
            .map_err(|e| GraphError::Connection {
                uri: self.uri.clone(),
                reason: e.to_string(),
            })
    }

    async fn ensure_index(&self, label: NodeLabel, property: &str) -> GraphResult<()> {
        // Schema statements take no parameters, so the property name is validated instead.
        if !is_identifier(property) {
            return Err(GraphError::Query(format!(
                "invalid index property name '{}'",
                property
            )));
        }

        let statement = format!(
            "CREATE INDEX IF NOT EXISTS FOR (n:{}) ON (n.{})",
            label.as_str(),
            property
        );
        self.graph
            .run(Query::new(statement))
            .await
            .map_err(|e| GraphError::Query(e.to_string()))
    }

    async fn upsert_nodes(&self, label: NodeLabel, nodes: &[NodeRecord]) -> GraphResult<()> {
        if nodes.is_empty() {
            return Ok(());
        }

        let rows: Vec<BoltType> = nodes
            .iter()
            .map(|node| {
                let mut row = BoltMap::new();
                row.put(BoltString::from("id"), BoltType::from(node.id.as_str()));
                row.put(BoltString::from("props"), properties_to_bolt(&node.properties));
                BoltType::Map(row)
            })
            .collect();

        let query = Query::new(format!(
            "UNWIND $rows AS row
             MERGE (n:{} {{id: row.id}})
             SET n = row.props",
            label.as_str()
        ))
        .param("rows", rows);

        debug!(label = %label, size = nodes.len(), "Upserting node batch");
        self.execute_atomic(query).await
    }

    async fn upsert_edges(&self, edge_type: EdgeType, edges: &[EdgeDescriptor]) -> GraphResult<()> {
        if edges.is_empty() {
            return Ok(());
        }

        let rows: Vec<BoltType> = edges
            .iter()
            .map(|edge| {
                let mut row = BoltMap::new();
                row.put(BoltString::from("from_id"), BoltType::from(edge.from_id()));
                row.put(BoltString::from("to_id"), BoltType::from(edge.to_id()));
                row.put(BoltString::from("props"), properties_to_bolt(&edge.properties()));
                BoltType::Map(row)
            })
            .collect();

        let (from_label, to_label) = edge_type.endpoints();
        let query = Query::new(format!(
            "UNWIND $rows AS row
             MATCH (a:{} {{id: row.from_id}})
             MATCH (b:{} {{id: row.to_id}})
             MERGE (a)-[r:{}]->(b)
             SET r = row.props",
            from_label.as_str(),
            to_label.as_str(),
            edge_type.as_str()
        ))
        .param("rows", rows);

        debug!(edge_type = %edge_type, size = edges.len(), "Upserting edge batch");
        self.execute_atomic(query).await
    }

    async fn count_nodes(&self, label: NodeLabel) -> GraphResult<usize> {
        let query = Query::new(format!(
            "MATCH (n:{}) RETURN count(n) AS count",
            label.as_str()
        ));
        self.query_count(query).await
    }

    async fn count_edges(&self, edge_type: EdgeType) -> GraphResult<usize> {
        let query = Query::new(format!(
            "MATCH ()-[r:{}]->() RETURN count(r) AS count",
            edge_type.as_str()
        ));
        self.query_count(query).await
    }

    async fn count_edges_with(
        &self,
        edge_type: EdgeType,
        property: &str,
        value: &str,
    ) -> GraphResult<usize> {
        let query = Query::new(format!(
            "MATCH ()-[r:{}]->() WHERE r[$property] = $value RETURN count(r) AS count",
            edge_type.as_str()
        ))
        .param("property", property)
        .param("value", value);
        self.query_count(query).await
    }

    async fn count_nodes_with_labels(&self, labels: &[NodeLabel]) -> GraphResult<usize> {
        if labels.is_empty() {
            return Ok(0);
        }
        let query = Query::new(format!(
            "MATCH (n) WHERE {} RETURN count(n) AS count",
            label_condition(labels)
        ));
        self.query_count(query).await
    }

    async fn delete_nodes_by_labels(&self, labels: &[NodeLabel]) -> GraphResult<usize> {
        let count = self.count_nodes_with_labels(labels).await?;
        if count == 0 {
            return Ok(0);
        }

        let query = Query::new(format!(
            "MATCH (n) WHERE {} DETACH DELETE n",
            label_condition(labels)
        ));
        self.execute_atomic(query).await?;
        Ok(count)
    }
}

/// `n:A OR n:B ...` over closed-enum labels.
fn label_condition(labels: &[NodeLabel]) -> String {
    labels
        .iter()
        .map(|label| format!("n:{}", label.as_str()))
        .collect::<Vec<_>>()
        .join(" OR ")
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn properties_to_bolt(props: &PropertyMap) -> BoltType {
    let mut map = BoltMap::new();
    for (key, value) in props {
        map.put(BoltString::from(key.as_str()), property_to_bolt(value));
    }
    BoltType::Map(map)
}

fn property_to_bolt(value: &PropertyValue) -> BoltType {
    match value {
        PropertyValue::Bool(b) => BoltType::from(*b),
        PropertyValue::Integer(i) => BoltType::from(*i),
        PropertyValue::Float(f) => BoltType::from(*f),
        PropertyValue::String(s) => BoltType::from(s.as_str()),
        PropertyValue::List(items) => {
            BoltType::from(items.iter().map(property_to_bolt).collect::<Vec<BoltType>>())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_condition() {
        assert_eq!(
            label_condition(&NodeLabel::ALL),
            "n:Congress OR n:Committee OR n:Person"
        );
    }

    #[test]
    fn test_identifier_validation() {
        assert!(is_identifier("full_name"));
        assert!(is_identifier("_internal"));
        assert!(!is_identifier("name) DETACH DELETE (n"));
        assert!(!is_identifier("1st"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_default_config() {
        let config = GraphConfig::default();
        assert_eq!(config.uri, "bolt://localhost:7687");
        assert_eq!(config.database, "neo4j");
    }

    #[test]
    fn test_property_map_converts() {
        let mut props = PropertyMap::new();
        props.insert("id".into(), PropertyValue::from("p1"));
        props.insert("aliases".into(), PropertyValue::from(vec!["JDC".to_string()]));
        assert!(matches!(properties_to_bolt(&props), BoltType::Map(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_connection_error() {
        let config = GraphConfig {
            uri: "bolt://127.0.0.1:1".to_string(),
            password: "unused".to_string(),
            ..GraphConfig::default()
        };

        let err = match GraphClient::open(&config).await {
            Ok(client) => client.ping().await.unwrap_err(),
            Err(e) => e,
        };
        assert!(matches!(err, GraphError::Connection { ref uri, .. } if uri == "bolt://127.0.0.1:1"));
        assert!(err.is_fatal());
    }
}
