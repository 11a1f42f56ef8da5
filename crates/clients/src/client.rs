use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use invotech_core::{Aggregate, AggregateRoot, DomainError, Entity, EntityId, entity_id};
use invotech_events::Event;

use crate::email::validate_email;

entity_id!(
    /// Client identifier.
    ClientId
);

/// Postal billing address. Every part is optional free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl BillingAddress {
    pub fn is_empty(&self) -> bool {
        [
            &self.street,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.country,
        ]
        .iter()
        .all(|part| part.trim().is_empty())
    }

    /// Display lines: street, then "city, state, postal code" with blanks
    /// skipped, then country. Empty lines are omitted.
    pub fn display_lines(&self) -> Vec<String> {
        let locality = [&self.city, &self.state, &self.postal_code]
            .into_iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        [self.street.trim().to_string(), locality, self.country.trim().to_string()]
            .into_iter()
            .filter(|line| !line.is_empty())
            .collect()
    }
}

/// Client profile fields as entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDetails {
    pub company_name: String,
    pub email: String,
    pub contact_person: String,
    pub phone: String,
    pub billing_address: BillingAddress,
}

impl ClientDetails {
    /// Required fields first (company name, email), then email format.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.company_name.trim().is_empty() || self.email.trim().is_empty() {
            return Err(DomainError::validation(
                "company name and email are required",
            ));
        }
        validate_email(self.email.trim())
    }

    fn normalized(&self) -> Self {
        Self {
            company_name: self.company_name.trim().to_string(),
            email: self.email.trim().to_string(),
            contact_person: self.contact_person.trim().to_string(),
            phone: self.phone.trim().to_string(),
            billing_address: self.billing_address.clone(),
        }
    }
}

/// Aggregate root: Client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    id: ClientId,
    #[serde(flatten)]
    details: ClientDetails,
    #[serde(skip)]
    version: u64,
    #[serde(skip)]
    created: bool,
}

impl Client {
    /// Create an empty, not-yet-registered instance.
    pub fn empty(id: ClientId) -> Self {
        Self {
            id,
            details: ClientDetails::default(),
            version: 0,
            created: false,
        }
    }

    pub fn company_name(&self) -> &str {
        &self.details.company_name
    }

    pub fn email(&self) -> &str {
        &self.details.email
    }

    pub fn contact_person(&self) -> &str {
        &self.details.contact_person
    }

    pub fn phone(&self) -> &str {
        &self.details.phone
    }

    pub fn billing_address(&self) -> &BillingAddress {
        &self.details.billing_address
    }

    pub fn details(&self) -> &ClientDetails {
        &self.details
    }

    pub fn is_registered(&self) -> bool {
        self.created
    }
}

impl Entity for Client {
    type Id = ClientId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Client {
    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterClient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterClient {
    pub client_id: ClientId,
    pub details: ClientDetails,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateClient (profile edit).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateClient {
    pub client_id: ClientId,
    pub details: ClientDetails,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientCommand {
    RegisterClient(RegisterClient),
    UpdateClient(UpdateClient),
}

/// Event: ClientRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRegistered {
    pub client_id: ClientId,
    pub details: ClientDetails,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ClientUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientUpdated {
    pub client_id: ClientId,
    pub details: ClientDetails,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientEvent {
    ClientRegistered(ClientRegistered),
    ClientUpdated(ClientUpdated),
}

impl Event for ClientEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ClientEvent::ClientRegistered(_) => "clients.client.registered",
            ClientEvent::ClientUpdated(_) => "clients.client.updated",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ClientEvent::ClientRegistered(e) => e.occurred_at,
            ClientEvent::ClientUpdated(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Client {
    type Command = ClientCommand;
    type Event = ClientEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ClientEvent::ClientRegistered(e) => {
                self.id = e.client_id.clone();
                self.details = e.details.clone();
                self.created = true;
            }
            ClientEvent::ClientUpdated(e) => {
                self.details = e.details.clone();
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ClientCommand::RegisterClient(cmd) => self.handle_register(cmd),
            ClientCommand::UpdateClient(cmd) => self.handle_update(cmd),
        }
    }
}

impl Client {
    fn ensure_client_id(&self, client_id: &ClientId) -> Result<(), DomainError> {
        if &self.id != client_id {
            return Err(DomainError::invariant("client_id mismatch"));
        }
        Ok(())
    }

    fn handle_register(&self, cmd: &RegisterClient) -> Result<Vec<ClientEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("client already exists"));
        }
        cmd.details.validate()?;

        Ok(vec![ClientEvent::ClientRegistered(ClientRegistered {
            client_id: cmd.client_id.clone(),
            details: cmd.details.normalized(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateClient) -> Result<Vec<ClientEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found(format!("client {}", cmd.client_id)));
        }
        self.ensure_client_id(&cmd.client_id)?;
        cmd.details.validate()?;

        Ok(vec![ClientEvent::ClientUpdated(ClientUpdated {
            client_id: cmd.client_id.clone(),
            details: cmd.details.normalized(),
            occurred_at: cmd.occurred_at,
        })])
    }
}

/// Build a registered client directly from trusted fixture data.
///
/// Runs the same validation as `RegisterClient`.
pub fn register(
    id: EntityId,
    details: ClientDetails,
    occurred_at: DateTime<Utc>,
) -> Result<Client, DomainError> {
    let client_id = ClientId::new(id);
    let mut client = Client::empty(client_id.clone());
    client.execute(&ClientCommand::RegisterClient(RegisterClient {
        client_id,
        details,
        occurred_at,
    }))?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client_id(raw: &str) -> ClientId {
        ClientId::new(EntityId::from_raw(raw))
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn techcorp() -> ClientDetails {
        ClientDetails {
            company_name: "TechCorp Solutions".to_string(),
            email: "billing@techcorp.com".to_string(),
            contact_person: "John Smith".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            billing_address: BillingAddress {
                street: "123 Technology Drive".to_string(),
                city: "San Francisco".to_string(),
                state: "CA".to_string(),
                postal_code: "94105".to_string(),
                country: "United States".to_string(),
            },
        }
    }

    #[test]
    fn register_client_emits_client_registered_event() {
        let client_id = test_client_id("1");
        let client = Client::empty(client_id.clone());
        let cmd = RegisterClient {
            client_id: client_id.clone(),
            details: techcorp(),
            occurred_at: test_time(),
        };

        let events = client
            .handle(&ClientCommand::RegisterClient(cmd))
            .unwrap();
        assert_eq!(events.len(), 1);

        match &events[0] {
            ClientEvent::ClientRegistered(e) => {
                assert_eq!(e.client_id, client_id);
                assert_eq!(e.details.company_name, "TechCorp Solutions");
                assert_eq!(e.details.email, "billing@techcorp.com");
            }
            _ => panic!("Expected ClientRegistered event"),
        }
    }

    #[test]
    fn register_requires_company_name_and_email() {
        let client = Client::empty(test_client_id("1"));
        let mut details = techcorp();
        details.company_name = "   ".to_string();

        let err = client
            .handle(&ClientCommand::RegisterClient(RegisterClient {
                client_id: test_client_id("1"),
                details,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("required")));
    }

    #[test]
    fn register_rejects_malformed_email() {
        let client = Client::empty(test_client_id("1"));
        let mut details = techcorp();
        details.email = "not-an-email".to_string();

        let err = client
            .handle(&ClientCommand::RegisterClient(RegisterClient {
                client_id: test_client_id("1"),
                details,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("email")));
    }

    #[test]
    fn cannot_register_twice() {
        let mut client = Client::empty(test_client_id("1"));
        let cmd = ClientCommand::RegisterClient(RegisterClient {
            client_id: test_client_id("1"),
            details: techcorp(),
            occurred_at: test_time(),
        });
        client.execute(&cmd).unwrap();
        assert_eq!(client.version(), 1);

        let err = client.handle(&cmd).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn update_replaces_details() {
        let mut client = register(EntityId::from_raw("7"), techcorp(), test_time()).unwrap();

        let mut details = techcorp();
        details.company_name = "TechCorp Global".to_string();
        client
            .execute(&ClientCommand::UpdateClient(UpdateClient {
                client_id: test_client_id("7"),
                details,
                occurred_at: test_time(),
            }))
            .unwrap();

        assert_eq!(client.company_name(), "TechCorp Global");
        assert_eq!(client.version(), 2);
    }

    #[test]
    fn update_on_unregistered_client_is_not_found() {
        let client = Client::empty(test_client_id("1"));
        let err = client
            .handle(&ClientCommand::UpdateClient(UpdateClient {
                client_id: test_client_id("1"),
                details: techcorp(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn registered_fields_are_trimmed() {
        let mut details = techcorp();
        details.company_name = "  TechCorp Solutions ".to_string();
        details.email = " billing@techcorp.com ".to_string();
        let client = register(EntityId::from_raw("1"), details, test_time()).unwrap();
        assert_eq!(client.company_name(), "TechCorp Solutions");
        assert_eq!(client.email(), "billing@techcorp.com");
    }

    #[test]
    fn address_display_skips_blank_parts() {
        let address = BillingAddress {
            street: String::new(),
            city: "Austin".to_string(),
            state: String::new(),
            postal_code: "73301".to_string(),
            country: "United States".to_string(),
        };
        assert_eq!(
            address.display_lines(),
            vec!["Austin, 73301".to_string(), "United States".to_string()]
        );
        assert!(BillingAddress::default().is_empty());
        assert!(BillingAddress::default().display_lines().is_empty());
    }
}
