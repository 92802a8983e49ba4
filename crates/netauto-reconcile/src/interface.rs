//! Description and MTU changes on one interface.

use netauto_model::Interface;
use netauto_render::Payload;
use netauto_session::{CommitResult, DeviceSession};
use tracing::{info, instrument};

use crate::error::{ConflictError, ReconcileResult};
use crate::reconciler::Reconciler;

/// Edits the description and MTU of an interface loaded from the device.
///
/// Every apply renders the interface's full description and MTU, whether
/// or not they changed since loading.
pub struct InterfaceManager<'s, S: DeviceSession + ?Sized> {
    session: &'s mut S,
    interface: Interface,
}

impl<'s, S: DeviceSession + ?Sized> InterfaceManager<'s, S> {
    /// Loads `name` from the device inventory.
    #[instrument(skip(session))]
    pub async fn load(session: &'s mut S, name: &str) -> ReconcileResult<Self> {
        let inventory = session.get_interfaces().await?;
        let interface = inventory
            .interface(name)
            .cloned()
            .ok_or_else(|| ConflictError::InterfaceNotFound {
                name: name.to_string(),
            })?;
        Ok(Self { session, interface })
    }

    pub fn interface(&self) -> &Interface {
        &self.interface
    }

    pub fn description(&self) -> Option<&str> {
        self.interface.description.as_deref()
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.interface.description = Some(description.into());
    }

    pub fn clear_description(&mut self) {
        self.interface.description = None;
    }

    pub fn mtu(&self) -> Option<u32> {
        self.interface.mtu
    }

    pub fn set_mtu(&mut self, mtu: Option<u32>) {
        self.interface.mtu = mtu;
    }

    /// Payload carrying the current description and MTU.
    pub fn render(&self) -> ReconcileResult<Payload> {
        let mut snapshot =
            Interface::new(self.interface.name.as_str())?.with_mtu(self.interface.mtu);
        snapshot.description = self.interface.description.clone();
        Ok(self.session.renderer().render_interface(&snapshot)?)
    }

    /// Renders and pushes the current description and MTU.
    pub async fn apply(&mut self, dry_run: bool) -> ReconcileResult<CommitResult> {
        let payload = self.render()?;
        info!(
            "Applying description {:?} and MTU {:?} to {}",
            self.interface.description, self.interface.mtu, self.interface.name
        );
        Reconciler::apply(self, &payload, dry_run).await
    }
}

impl<S: DeviceSession + ?Sized> Reconciler for InterfaceManager<'_, S> {
    type Session = S;

    fn session(&mut self) -> &mut S {
        self.session
    }
}
