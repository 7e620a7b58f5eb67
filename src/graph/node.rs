use super::ids::IdGenerator;
use super::model::Position;
use crate::error::NodeDecodeError;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;

/// The closed set of node kinds a workflow can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Trigger,
    Condition,
    Action,
    Delay,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Trigger => "trigger",
            NodeType::Condition => "condition",
            NodeType::Action => "action",
            NodeType::Delay => "delay",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Master macro for the closed string enumerations carried in node payloads.
///
/// Generates the enum with `snake_case` serde names, an `ALL` table, `as_str` and `Display`.
macro_rules! define_wire_enum {
    ( $(#[$meta:meta])* $name:ident { $( $variant:ident => $wire:literal ),* $(,)? } ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( #[serde(rename = $wire)] $variant, )*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[ $( $name::$variant, )* ];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $wire, )*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $( $wire => Some($name::$variant), )*
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_wire_enum! {
    /// Events that can start a workflow instance.
    EventType {
        ReturnCreated => "return_created",
        ReturnApproved => "return_approved",
        ReturnRejected => "return_rejected",
        ReturnReceived => "return_received",
        ReturnRefunded => "return_refunded",
        ReturnStatusChanged => "return_status_changed",
        TicketCreated => "ticket_created",
        TicketUpdated => "ticket_updated",
        TicketResolved => "ticket_resolved",
        CustomerCreated => "customer_created",
        CustomerUpdated => "customer_updated",
        ScheduleDaily => "schedule_daily",
        ScheduleWeekly => "schedule_weekly",
        ScheduleMonthly => "schedule_monthly",
        Manual => "manual",
    }
}

impl EventType {
    /// Time-based events carry a [`Schedule`]; all others fire on an entity lifecycle change.
    pub fn is_time_based(&self) -> bool {
        matches!(
            self,
            EventType::ScheduleDaily | EventType::ScheduleWeekly | EventType::ScheduleMonthly
        )
    }

    /// The schedule a freshly placed trigger of this type starts with.
    pub fn default_schedule(&self) -> Option<Schedule> {
        let time = "09:00".to_string();
        match self {
            EventType::ScheduleDaily => Some(Schedule {
                time,
                day_of_week: None,
                day_of_month: None,
            }),
            EventType::ScheduleWeekly => Some(Schedule {
                time,
                day_of_week: Some(1),
                day_of_month: None,
            }),
            EventType::ScheduleMonthly => Some(Schedule {
                time,
                day_of_week: None,
                day_of_month: Some(1),
            }),
            _ => None,
        }
    }
}

define_wire_enum! {
    /// Comparison applied by a single field condition.
    ConditionOperator {
        Equals => "equals",
        NotEquals => "not_equals",
        Contains => "contains",
        NotContains => "not_contains",
        GreaterThan => "greater_than",
        LessThan => "less_than",
        GreaterOrEqual => "greater_or_equal",
        LessOrEqual => "less_or_equal",
        In => "in",
        NotIn => "not_in",
        IsEmpty => "is_empty",
        IsNotEmpty => "is_not_empty",
        MatchesRegex => "matches_regex",
    }
}

/// How many operands an operator takes besides the field itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorArity {
    Unary,
    Binary,
}

impl ConditionOperator {
    pub fn arity(&self) -> OperatorArity {
        match self {
            ConditionOperator::IsEmpty | ConditionOperator::IsNotEmpty => OperatorArity::Unary,
            _ => OperatorArity::Binary,
        }
    }

    /// Human-readable verb used when describing a condition.
    pub fn label(&self) -> &'static str {
        match self {
            ConditionOperator::Equals => "equals",
            ConditionOperator::NotEquals => "does not equal",
            ConditionOperator::Contains => "contains",
            ConditionOperator::NotContains => "does not contain",
            ConditionOperator::GreaterThan => ">",
            ConditionOperator::LessThan => "<",
            ConditionOperator::GreaterOrEqual => ">=",
            ConditionOperator::LessOrEqual => "<=",
            ConditionOperator::In => "is one of",
            ConditionOperator::NotIn => "is not one of",
            ConditionOperator::IsEmpty => "is empty",
            ConditionOperator::IsNotEmpty => "is not empty",
            ConditionOperator::MatchesRegex => "matches",
        }
    }
}

/// The five families action types are grouped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionFamily {
    Return,
    Ticket,
    Customer,
    Notification,
    Utility,
}

impl ActionFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionFamily::Return => "return",
            ActionFamily::Ticket => "ticket",
            ActionFamily::Customer => "customer",
            ActionFamily::Notification => "notification",
            ActionFamily::Utility => "utility",
        }
    }
}

impl fmt::Display for ActionFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

define_wire_enum! {
    /// Side-effecting steps an action node can perform.
    ActionType {
        UpdateReturnStatus => "update_return_status",
        ApproveReturn => "approve_return",
        RejectReturn => "reject_return",
        IssueRefund => "issue_refund",
        AssignReturn => "assign_return",
        CreateTicket => "create_ticket",
        UpdateTicketStatus => "update_ticket_status",
        AssignTicket => "assign_ticket",
        AddTicketNote => "add_ticket_note",
        TagCustomer => "tag_customer",
        UpdateCustomerRisk => "update_customer_risk",
        SendEmail => "send_email",
        SendNotification => "send_notification",
        NotifyTeam => "notify_team",
        Webhook => "webhook",
        LogEvent => "log_event",
    }
}

impl ActionType {
    pub fn family(&self) -> ActionFamily {
        match self {
            ActionType::UpdateReturnStatus
            | ActionType::ApproveReturn
            | ActionType::RejectReturn
            | ActionType::IssueRefund
            | ActionType::AssignReturn => ActionFamily::Return,
            ActionType::CreateTicket
            | ActionType::UpdateTicketStatus
            | ActionType::AssignTicket
            | ActionType::AddTicketNote => ActionFamily::Ticket,
            ActionType::TagCustomer | ActionType::UpdateCustomerRisk => ActionFamily::Customer,
            ActionType::SendEmail | ActionType::SendNotification | ActionType::NotifyTeam => {
                ActionFamily::Notification
            }
            ActionType::Webhook | ActionType::LogEvent => ActionFamily::Utility,
        }
    }
}

/// When a time-based trigger fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// Local wall-clock time, `HH:MM`.
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerData {
    pub event_type: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
}

impl TriggerData {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            schedule: event_type.default_schedule(),
        }
    }

    /// A schedule is present exactly when the event type is time-based.
    pub fn schedule_matches_event(&self) -> bool {
        self.event_type.is_time_based() == self.schedule.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LogicOperator {
    #[default]
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

impl LogicOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicOperator::And => "AND",
            LogicOperator::Or => "OR",
        }
    }
}

/// A single comparison against a field of the return, customer or ticket being processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCondition {
    pub id: String,
    /// Dotted path, `namespace.key`.
    pub field: String,
    pub operator: ConditionOperator,
    #[serde(default)]
    pub value: JsonValue,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionData {
    #[serde(default)]
    pub logic_operator: LogicOperator,
    #[serde(default)]
    pub conditions: Vec<FieldCondition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionData {
    pub action_type: ActionType,
    /// Action-specific parameters. Their shape is checked by whatever executes the workflow.
    #[serde(default)]
    pub params: Map<String, JsonValue>,
}

impl ActionData {
    pub fn new(action_type: ActionType) -> Self {
        Self {
            action_type,
            params: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelayUnit {
    Minutes,
    Hours,
    Days,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayData {
    pub amount: NonZeroU32,
    pub unit: DelayUnit,
}

impl DelayData {
    pub fn to_duration(&self) -> Duration {
        let seconds = match self.unit {
            DelayUnit::Minutes => 60,
            DelayUnit::Hours => 60 * 60,
            DelayUnit::Days => 24 * 60 * 60,
        };
        Duration::from_secs(u64::from(self.amount.get()) * seconds)
    }
}

impl Default for DelayData {
    fn default() -> Self {
        Self {
            amount: NonZeroU32::MIN,
            unit: DelayUnit::Hours,
        }
    }
}

/// Type-specific payload of a node. The variant determines the node's [`NodeType`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NodeData {
    Trigger(TriggerData),
    Condition(ConditionData),
    Action(ActionData),
    Delay(DelayData),
}

impl NodeData {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeData::Trigger(_) => NodeType::Trigger,
            NodeData::Condition(_) => NodeType::Condition,
            NodeData::Action(_) => NodeType::Action,
            NodeData::Delay(_) => NodeType::Delay,
        }
    }

    /// The payload a freshly placed node of `node_type` starts with.
    pub fn default_for(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Trigger => NodeData::Trigger(TriggerData::new(EventType::Manual)),
            NodeType::Condition => NodeData::Condition(ConditionData::default()),
            NodeType::Action => NodeData::Action(ActionData::new(ActionType::LogEvent)),
            NodeType::Delay => NodeData::Delay(DelayData::default()),
        }
    }

    /// Decodes a raw `data` blob according to the declared node type.
    pub fn decode(
        node_id: &str,
        node_type: NodeType,
        data: JsonValue,
    ) -> Result<Self, NodeDecodeError> {
        let invalid = |message: String| NodeDecodeError::InvalidPayload {
            node_id: node_id.to_string(),
            node_type: node_type.to_string(),
            message,
        };
        let decoded = match node_type {
            NodeType::Trigger => serde_json::from_value(data).map(NodeData::Trigger),
            NodeType::Condition => serde_json::from_value(data).map(NodeData::Condition),
            NodeType::Action => serde_json::from_value(data).map(NodeData::Action),
            NodeType::Delay => serde_json::from_value(data).map(NodeData::Delay),
        }
        .map_err(|e| invalid(e.to_string()))?;

        if let NodeData::Trigger(trigger) = &decoded {
            if !trigger.schedule_matches_event() {
                return Err(invalid(schedule_mismatch_message(trigger.event_type)));
            }
        }
        Ok(decoded)
    }
}

fn schedule_mismatch_message(event_type: EventType) -> String {
    if event_type.is_time_based() {
        format!("'{}' triggers need a schedule", event_type)
    } else {
        format!("'{}' triggers cannot carry a schedule", event_type)
    }
}

/// Palette-supplied specifics applied on top of a node's default payload.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeOverrides {
    pub action_type: Option<ActionType>,
    pub event_type: Option<EventType>,
}

/// The atomic unit of a workflow: a fixed-size box on the canvas with a typed payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "NodeRepr")]
pub struct Node {
    pub id: String,
    /// Top-left corner in canvas units.
    pub position: Position,
    pub label: String,
    pub data: NodeData,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        position: Position,
        label: impl Into<String>,
        data: NodeData,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            label: label.into(),
            data,
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.data.node_type()
    }
}

/// Builds a node with the default payload for `node_type`, then applies `overrides`.
///
/// Overrides that do not apply to the node type are ignored.
pub fn create_node(
    ids: &mut IdGenerator,
    node_type: NodeType,
    position: Position,
    label: impl Into<String>,
    overrides: NodeOverrides,
) -> Node {
    let mut data = NodeData::default_for(node_type);
    match &mut data {
        NodeData::Trigger(trigger) => {
            if let Some(event_type) = overrides.event_type {
                *trigger = TriggerData::new(event_type);
            }
        }
        NodeData::Action(action) => {
            if let Some(action_type) = overrides.action_type {
                action.action_type = action_type;
            }
        }
        NodeData::Condition(_) | NodeData::Delay(_) => {}
    }
    Node::new(ids.next_node_id(), position, label, data)
}

/// Wire shape of a node: `{id, type, position, label, data}`.
#[derive(Deserialize)]
struct NodeRepr {
    id: String,
    #[serde(rename = "type")]
    node_type: NodeType,
    position: Position,
    #[serde(default)]
    label: String,
    #[serde(default)]
    data: JsonValue,
}

impl TryFrom<NodeRepr> for Node {
    type Error = NodeDecodeError;

    fn try_from(repr: NodeRepr) -> Result<Self, Self::Error> {
        let data = NodeData::decode(&repr.id, repr.node_type, repr.data)?;
        Ok(Node {
            id: repr.id,
            position: repr.position,
            label: repr.label,
            data,
        })
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Node", 5)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("type", &self.node_type())?;
        state.serialize_field("position", &self.position)?;
        state.serialize_field("label", &self.label)?;
        state.serialize_field("data", &self.data)?;
        state.end()
    }
}
