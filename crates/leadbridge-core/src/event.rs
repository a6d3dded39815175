//! The source-system event catalogue and the routing table.
//!
//! Every known webhook event type is a variant of [`EventKind`]; routing is
//! an exhaustive match from kind to [`Handler`] rather than a chain of
//! string comparisons, so adding a variant without wiring a handler is a
//! compile error.

/// Every webhook event type the bridge understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    CustomerCreated,
    CustomerUpdated,
    CustomerDeleted,
    EstimateCreated,
    EstimateScheduled,
    EstimateOnMyWay,
    EstimateCompleted,
    EstimateSent,
    EstimateOptionCreated,
    EstimateApprovalChanged,
    EstimateCopyToJob,
    JobCreated,
    JobUpdated,
    JobScheduled,
    JobOnMyWay,
    JobStarted,
    JobCompleted,
    JobCanceled,
    JobDeleted,
    JobPaid,
    AppointmentScheduled,
    AppointmentRescheduled,
    AppointmentProsAssigned,
    AppointmentProsUnassigned,
    AppointmentDiscarded,
}

impl EventKind {
    /// The full catalogue, used by completeness tests.
    pub const CATALOG: &'static [EventKind] = &[
        Self::CustomerCreated,
        Self::CustomerUpdated,
        Self::CustomerDeleted,
        Self::EstimateCreated,
        Self::EstimateScheduled,
        Self::EstimateOnMyWay,
        Self::EstimateCompleted,
        Self::EstimateSent,
        Self::EstimateOptionCreated,
        Self::EstimateApprovalChanged,
        Self::EstimateCopyToJob,
        Self::JobCreated,
        Self::JobUpdated,
        Self::JobScheduled,
        Self::JobOnMyWay,
        Self::JobStarted,
        Self::JobCompleted,
        Self::JobCanceled,
        Self::JobDeleted,
        Self::JobPaid,
        Self::AppointmentScheduled,
        Self::AppointmentRescheduled,
        Self::AppointmentProsAssigned,
        Self::AppointmentProsUnassigned,
        Self::AppointmentDiscarded,
    ];

    /// Parse a raw event-type string. Unknown strings return `None`.
    pub fn parse(event_type: &str) -> Option<Self> {
        let kind = match event_type {
            "customer.created" => Self::CustomerCreated,
            "customer.updated" => Self::CustomerUpdated,
            "customer.deleted" => Self::CustomerDeleted,
            "estimate.created" => Self::EstimateCreated,
            "estimate.scheduled" => Self::EstimateScheduled,
            "estimate.on_my_way" => Self::EstimateOnMyWay,
            "estimate.completed" => Self::EstimateCompleted,
            "estimate.sent" => Self::EstimateSent,
            "estimate.option.created" => Self::EstimateOptionCreated,
            "estimate.option.approval_status_changed" => Self::EstimateApprovalChanged,
            "estimate.copy_to_job" => Self::EstimateCopyToJob,
            "job.created" => Self::JobCreated,
            "job.updated" => Self::JobUpdated,
            "job.scheduled" => Self::JobScheduled,
            "job.on_my_way" => Self::JobOnMyWay,
            "job.started" => Self::JobStarted,
            "job.completed" => Self::JobCompleted,
            "job.canceled" => Self::JobCanceled,
            "job.deleted" => Self::JobDeleted,
            "job.paid" => Self::JobPaid,
            "job.appointment.scheduled" => Self::AppointmentScheduled,
            "job.appointment.rescheduled" => Self::AppointmentRescheduled,
            "job.appointment.appointment_pros_assigned" => Self::AppointmentProsAssigned,
            "job.appointment.appointment_pros_unassigned" => Self::AppointmentProsUnassigned,
            "job.appointment.appointment_discarded" => Self::AppointmentDiscarded,
            _ => return None,
        };
        Some(kind)
    }

    /// The raw event-type string as sent by the source system.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustomerCreated => "customer.created",
            Self::CustomerUpdated => "customer.updated",
            Self::CustomerDeleted => "customer.deleted",
            Self::EstimateCreated => "estimate.created",
            Self::EstimateScheduled => "estimate.scheduled",
            Self::EstimateOnMyWay => "estimate.on_my_way",
            Self::EstimateCompleted => "estimate.completed",
            Self::EstimateSent => "estimate.sent",
            Self::EstimateOptionCreated => "estimate.option.created",
            Self::EstimateApprovalChanged => "estimate.option.approval_status_changed",
            Self::EstimateCopyToJob => "estimate.copy_to_job",
            Self::JobCreated => "job.created",
            Self::JobUpdated => "job.updated",
            Self::JobScheduled => "job.scheduled",
            Self::JobOnMyWay => "job.on_my_way",
            Self::JobStarted => "job.started",
            Self::JobCompleted => "job.completed",
            Self::JobCanceled => "job.canceled",
            Self::JobDeleted => "job.deleted",
            Self::JobPaid => "job.paid",
            Self::AppointmentScheduled => "job.appointment.scheduled",
            Self::AppointmentRescheduled => "job.appointment.rescheduled",
            Self::AppointmentProsAssigned => "job.appointment.appointment_pros_assigned",
            Self::AppointmentProsUnassigned => "job.appointment.appointment_pros_unassigned",
            Self::AppointmentDiscarded => "job.appointment.appointment_discarded",
        }
    }

    /// The engine operation this event maps to.
    pub fn handler(&self) -> Handler {
        match self {
            Self::CustomerCreated => Handler::ContactCreated,
            Self::CustomerUpdated => Handler::ContactUpdated,
            Self::CustomerDeleted => Handler::ContactDeleted,
            Self::EstimateCreated
            | Self::EstimateScheduled
            | Self::EstimateOnMyWay
            | Self::EstimateCompleted
            | Self::EstimateSent
            | Self::EstimateOptionCreated
            | Self::EstimateApprovalChanged => Handler::EstimateUpsert,
            Self::EstimateCopyToJob => Handler::EstimateCopyToJob,
            Self::JobCreated
            | Self::JobUpdated
            | Self::JobScheduled
            | Self::JobOnMyWay
            | Self::JobStarted => Handler::JobUpsert,
            Self::JobCompleted => Handler::JobCompleted,
            Self::JobCanceled | Self::JobDeleted => Handler::JobClosedLost,
            Self::JobPaid => Handler::JobPaid,
            Self::AppointmentScheduled
            | Self::AppointmentRescheduled
            | Self::AppointmentProsAssigned
            | Self::AppointmentProsUnassigned
            | Self::AppointmentDiscarded => Handler::JobAppointment,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The engine operations an event can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    ContactCreated,
    ContactUpdated,
    ContactDeleted,
    EstimateUpsert,
    EstimateCopyToJob,
    JobUpsert,
    JobCompleted,
    JobClosedLost,
    JobPaid,
    JobAppointment,
}

/// Routing outcome for a raw event-type string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    Handled(EventKind, Handler),
    /// Unknown event types are acknowledged, never an error.
    Unhandled,
}

/// Map a raw event-type string to the handler to invoke.
pub fn route(event_type: &str) -> Routed {
    match EventKind::parse(event_type) {
        Some(kind) => Routed::Handled(kind, kind.handler()),
        None => Routed::Unhandled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_the_whole_catalogue() {
        for kind in EventKind::CATALOG {
            assert_eq!(EventKind::parse(kind.as_str()), Some(*kind));
        }
    }

    #[test]
    fn unknown_event_types_are_unhandled() {
        assert_eq!(EventKind::parse("foo.bar"), None);
        assert_eq!(route("foo.bar"), Routed::Unhandled);
        assert_eq!(route(""), Routed::Unhandled);
        assert_eq!(route("customer.renamed"), Routed::Unhandled);
    }

    #[test]
    fn every_catalogue_entry_routes_to_a_handler() {
        for kind in EventKind::CATALOG {
            match route(kind.as_str()) {
                Routed::Handled(parsed, _) => assert_eq!(parsed, *kind),
                Routed::Unhandled => panic!("{kind} missing from routing table"),
            }
        }
    }

    #[test]
    fn estimate_sub_events_share_the_upsert_handler() {
        for raw in [
            "estimate.created",
            "estimate.scheduled",
            "estimate.on_my_way",
            "estimate.completed",
            "estimate.sent",
            "estimate.option.created",
            "estimate.option.approval_status_changed",
        ] {
            assert_eq!(
                route(raw),
                Routed::Handled(EventKind::parse(raw).unwrap(), Handler::EstimateUpsert)
            );
        }
        // copy_to_job is the exception
        assert_eq!(
            route("estimate.copy_to_job"),
            Routed::Handled(EventKind::EstimateCopyToJob, Handler::EstimateCopyToJob)
        );
    }

    #[test]
    fn terminal_job_events_route_to_close_handlers() {
        assert_eq!(
            EventKind::JobCompleted.handler(),
            Handler::JobCompleted
        );
        assert_eq!(EventKind::JobPaid.handler(), Handler::JobPaid);
        assert_eq!(EventKind::JobCanceled.handler(), Handler::JobClosedLost);
        assert_eq!(EventKind::JobDeleted.handler(), Handler::JobClosedLost);
    }
}
