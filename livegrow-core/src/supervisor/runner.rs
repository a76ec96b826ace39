//! Supervisor loop

use embedded_hal_async::delay::DelayNs;
use rand_core::RngCore;

use super::state::{LinkEvent, LinkState};
use crate::config::DeviceConfig;
use crate::connection::{ConnectionHandler, HandleOutcome};
use crate::fault::Fault;
use crate::message::StoredMessage;
use crate::scheduler::{show_banner, DisplayScheduler, MAIN_ERROR};
use crate::traits::{CharDisplay, ClimateSensor, NetworkLink};

/// Owns every collaborator and drives the loop
///
/// The listener and the stored message are owned here and lent to the
/// connection handler and display scheduler one tick at a time.
pub struct Supervisor<N: NetworkLink, D, S, P, R> {
    link: N,
    display: D,
    sensor: S,
    delay: P,
    scheduler: DisplayScheduler<R>,
    handler: ConnectionHandler,
    message: StoredMessage,
    listener: Option<N::Listener>,
    state: LinkState,
    config: DeviceConfig,
}

impl<N, D, S, P, R> Supervisor<N, D, S, P, R>
where
    N: NetworkLink,
    D: CharDisplay,
    S: ClimateSensor,
    P: DelayNs,
    R: RngCore,
{
    /// Create a supervisor in the `Disconnected` state
    pub fn new(config: DeviceConfig, link: N, display: D, sensor: S, delay: P, rng: R) -> Self {
        Self {
            link,
            display,
            sensor,
            delay,
            scheduler: DisplayScheduler::new(rng, &config),
            handler: ConnectionHandler::new(config.network.accept_timeout_ms),
            message: StoredMessage::new(),
            listener: None,
            state: LinkState::Disconnected,
            config,
        }
    }

    /// Current link state
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Last stored message
    pub fn message(&self) -> &StoredMessage {
        &self.message
    }

    /// Show the idle banner as a boot splash
    pub async fn boot(&mut self) {
        info!("boot splash");
        if let Err(e) = show_banner(&mut self.display, self.scheduler.idle_banner()).await {
            warn!("splash failed: {}", e);
        }
        self.delay.delay_ms(self.config.timing.splash_ms).await;
    }

    /// Splash, then tick forever
    pub async fn run(&mut self) -> ! {
        self.boot().await;
        loop {
            self.step().await;
        }
    }

    /// Run one tick, containing any fault it raises
    ///
    /// Returns the fault that was shown as the main error banner, if any.
    pub async fn step(&mut self) -> Option<Fault> {
        let fault = self.tick().await.err()?;

        error!("tick failed: {}", fault);
        if let Err(e) = show_banner(&mut self.display, MAIN_ERROR).await {
            warn!("main error banner failed: {}", e);
        }
        self.delay.delay_ms(self.config.timing.fault_ms).await;
        Some(fault)
    }

    async fn tick(&mut self) -> Result<(), Fault> {
        match self.state {
            LinkState::Disconnected => {
                if !self.associate().await {
                    self.state = self.state.transition(LinkEvent::AssociationFailed);
                    warn!(
                        "association failed, retrying in {} ms",
                        self.config.association.retry_backoff_ms
                    );
                    self.delay
                        .delay_ms(self.config.association.retry_backoff_ms)
                        .await;
                    return Ok(());
                }
                info!("associated");
                self.state = self.state.transition(LinkEvent::Associated);
            }
            LinkState::Connected => {
                if !self.link.is_associated().await {
                    warn!("link lost");
                    self.state = self.state.transition(LinkEvent::AssociationLost);
                    self.listener = None;
                    return Ok(());
                }
            }
        }

        let listener = match self.listener.take() {
            Some(listener) => listener,
            None => self.open_listener().await?,
        };
        let listener = self.listener.insert(listener);

        match self.handler.handle(listener, &mut self.message).await {
            HandleOutcome::Served { updated: true } if self.config.announce_on_receive => {
                self.scheduler
                    .show_message(
                        &mut self.display,
                        &mut self.delay,
                        self.message.text(),
                        self.config.timing.scroll_page_ms,
                    )
                    .await?;
            }
            HandleOutcome::ListenerFailed(_) => {
                self.listener = None;
                self.listener = Some(self.open_listener().await?);
            }
            _ => {}
        }

        self.scheduler
            .tick(
                &mut self.display,
                &mut self.sensor,
                &mut self.delay,
                &self.message,
            )
            .await?;
        Ok(())
    }

    /// One association attempt: request, then poll the link
    async fn associate(&mut self) -> bool {
        if let Err(e) = self.link.start_association().await {
            warn!("association request failed: {}", e);
            return false;
        }

        let policy = self.config.association;
        for poll in 1..=policy.max_polls {
            if self.link.is_associated().await {
                return true;
            }
            debug!("waiting for association ({}/{})", poll, policy.max_polls);
            if poll < policy.max_polls {
                self.delay.delay_ms(policy.poll_interval_ms).await;
            }
        }
        false
    }

    async fn open_listener(&mut self) -> Result<N::Listener, Fault> {
        let port = self.config.network.port;
        let listener = self.link.listen(port).await.map_err(Fault::NetworkFatal)?;
        info!("listening on port {}", port);
        Ok(listener)
    }
}
