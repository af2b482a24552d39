// ── Device seam ──
//
// The controller talks to the element only through `NimbraDevice`. The
// production implementation is the HTTP `VisionClient`; tests plug in an
// in-memory fake.

use std::future::Future;

use tracing::debug;

use nimbra_api::{CreateCircuitFields, ElementInfo, InterAppMessage, Row, VisionClient};

use crate::error::CoreError;

/// Operations the lifecycle controller needs from a Nimbra Vision element.
pub trait NimbraDevice: Send + Sync {
    /// Element header (name and state).
    fn element_info(&self) -> impl Future<Output = Result<ElementInfo, CoreError>> + Send;

    /// Fresh read of table `pid`.
    fn read_table(&self, pid: u32) -> impl Future<Output = Result<Vec<Row>, CoreError>> + Send;

    /// Write a creation request to the circuit-creation parameter.
    fn submit_circuit(
        &self,
        fields: &CreateCircuitFields,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Deliver an inter-app message (delete / edit).
    fn send_message(
        &self,
        message: &InterAppMessage,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

impl NimbraDevice for VisionClient {
    async fn element_info(&self) -> Result<ElementInfo, CoreError> {
        Ok(self.get_element().await?)
    }

    async fn read_table(&self, pid: u32) -> Result<Vec<Row>, CoreError> {
        let rows = VisionClient::read_table(self, pid).await?;
        debug!(pid, rows = rows.len(), "table read");
        Ok(rows)
    }

    async fn submit_circuit(&self, fields: &CreateCircuitFields) -> Result<(), CoreError> {
        Ok(self.create_circuit(fields).await?)
    }

    async fn send_message(&self, message: &InterAppMessage) -> Result<(), CoreError> {
        self.send_interapp(message).await?;
        Ok(())
    }
}
