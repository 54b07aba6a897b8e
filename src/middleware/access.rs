// src/middleware/access.rs

//! Gate de papel e de clínica na frente de cada serviço de recurso.
//!
//! [`authorize`] é uma decisão pura sobre uma identidade e uma requisição
//! completamente descrita. [`AccessGate::enforce`] confere o papel primeiro,
//! busca a clínica dona do item só para quem precisa dessa checagem e então
//! pede a decisão final a [`authorize`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Identity, Role},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Clinic,
    Patient,
}

impl Resource {
    /// Recursos cujas linhas pertencem a uma clínica.
    pub fn is_clinic_scoped(self) -> bool {
        matches!(self, Resource::Patient)
    }

    pub fn label(self) -> &'static str {
        match self {
            Resource::Clinic => "clinic",
            Resource::Patient => "patient",
        }
    }

    pub fn permitted_roles(self, action: Action) -> &'static [Role] {
        use Action::*;
        match (self, action) {
            (Resource::Clinic, List | Read) => &[Role::Superadmin, Role::Admin],
            (Resource::Clinic, Create | Update | Delete) => &[Role::Superadmin],
            (Resource::Patient, List | Read | Create | Update) => {
                &[Role::Superadmin, Role::Admin, Role::Doctor]
            }
            (Resource::Patient, Delete) => &[Role::Superadmin, Role::Admin],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Read,
    Create,
    Update,
    Delete,
}

/// Dono de um item já existente, tal como o gate o conhece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Unresolved,
    Absent,
    Clinic(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Collection,
    Item { id: Uuid, owner: Ownership },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRequest {
    pub resource: Resource,
    pub action: Action,
    pub target: Target,
    pub payload_clinic_id: Option<Uuid>,
}

impl AccessRequest {
    pub fn collection(resource: Resource, action: Action) -> Self {
        Self {
            resource,
            action,
            target: Target::Collection,
            payload_clinic_id: None,
        }
    }

    pub fn item(resource: Resource, action: Action, id: Uuid) -> Self {
        Self {
            resource,
            action,
            target: Target::Item {
                id,
                owner: Ownership::Unresolved,
            },
            payload_clinic_id: None,
        }
    }

    pub fn with_clinic(mut self, clinic_id: Option<Uuid>) -> Self {
        self.payload_clinic_id = clinic_id;
        self
    }
}

/// Quais linhas o chamador pode ver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TenantScope {
    All,
    Clinic(Uuid),
}

impl TenantScope {
    pub fn clinic_id(self) -> Option<Uuid> {
        match self {
            TenantScope::All => None,
            TenantScope::Clinic(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("papel sem permissão para esta rota")]
    RoleNotPermitted,
    #[error("usuário sem clínica associada")]
    NoClinicAssigned,
    #[error("recurso de outra clínica")]
    ForeignTenant,
    #[error("recurso inexistente")]
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow(TenantScope),
    AllowWithTenant(Uuid),
    Deny(Denial),
}

/// Resultado de um `enforce` bem-sucedido.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grant {
    pub scope: TenantScope,
    /// Clínica a gravar: a do payload, ou a do chamador quando injetada.
    pub clinic_id: Option<Uuid>,
}

pub fn check_role(identity: &Identity, resource: Resource, action: Action) -> Result<(), Denial> {
    if resource.permitted_roles(action).contains(&identity.role) {
        Ok(())
    } else {
        Err(Denial::RoleNotPermitted)
    }
}

pub fn authorize(identity: &Identity, request: &AccessRequest) -> Decision {
    if let Err(denial) = check_role(identity, request.resource, request.action) {
        return Decision::Deny(denial);
    }

    if !request.resource.is_clinic_scoped() || identity.role.is_superadmin() {
        return Decision::Allow(TenantScope::All);
    }

    let Some(own_clinic) = identity.clinic_id else {
        return Decision::Deny(Denial::NoClinicAssigned);
    };

    // Existência primeiro, depois o dono
    if let Target::Item { owner, .. } = request.target {
        match owner {
            Ownership::Absent => return Decision::Deny(Denial::Missing),
            Ownership::Clinic(owner) if owner != own_clinic => {
                return Decision::Deny(Denial::ForeignTenant);
            }
            Ownership::Clinic(_) => {}
            // Sem dono resolvido não há como provar a posse
            Ownership::Unresolved => return Decision::Deny(Denial::ForeignTenant),
        }
    }

    match (request.payload_clinic_id, request.action) {
        (Some(requested), _) if requested != own_clinic => Decision::Deny(Denial::ForeignTenant),
        (None, Action::Create | Action::Update) => Decision::AllowWithTenant(own_clinic),
        _ => Decision::Allow(TenantScope::Clinic(own_clinic)),
    }
}

/// Fonte do `clinic_id` dono de um item.
#[async_trait]
pub trait OwnershipLookup: Send + Sync {
    async fn owning_clinic(&self, id: Uuid) -> Result<Option<Uuid>, AppError>;
}

#[derive(Clone)]
pub struct AccessGate {
    patients: Arc<dyn OwnershipLookup>,
}

impl AccessGate {
    pub fn new(patients: Arc<dyn OwnershipLookup>) -> Self {
        Self { patients }
    }

    fn lookup_for(&self, resource: Resource) -> Option<&dyn OwnershipLookup> {
        match resource {
            Resource::Patient => Some(self.patients.as_ref()),
            Resource::Clinic => None,
        }
    }

    pub async fn enforce(
        &self,
        identity: &Identity,
        mut request: AccessRequest,
    ) -> Result<Grant, AppError> {
        // Sem o papel certo o chamador nem descobre se o item existe
        check_role(identity, request.resource, request.action)
            .map_err(|denial| deny(identity, &request, denial))?;

        let needs_owner = request.resource.is_clinic_scoped()
            && !identity.role.is_superadmin()
            && identity.clinic_id.is_some();

        if let Target::Item { id, owner } = &mut request.target {
            if needs_owner {
                if let Some(lookup) = self.lookup_for(request.resource) {
                    *owner = match lookup.owning_clinic(*id).await? {
                        Some(clinic_id) => Ownership::Clinic(clinic_id),
                        None => Ownership::Absent,
                    };
                }
            }
        }

        match authorize(identity, &request) {
            Decision::Allow(scope) => Ok(Grant {
                scope,
                clinic_id: request.payload_clinic_id,
            }),
            Decision::AllowWithTenant(clinic_id) => Ok(Grant {
                scope: TenantScope::Clinic(clinic_id),
                clinic_id: Some(clinic_id),
            }),
            Decision::Deny(denial) => Err(deny(identity, &request, denial)),
        }
    }
}

fn deny(identity: &Identity, request: &AccessRequest, denial: Denial) -> AppError {
    tracing::warn!(
        user_id = %identity.id,
        role = ?identity.role,
        resource = request.resource.label(),
        action = ?request.action,
        "acesso negado: {}",
        denial
    );
    match denial {
        Denial::Missing => AppError::NotFound(request.resource.label()),
        other => AppError::Forbidden(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn identity(role: Role, clinic_id: Option<Uuid>) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            document_number: "1000".into(),
            role,
            clinic_id,
        }
    }

    fn resolved(resource: Resource, action: Action, owner: Ownership) -> AccessRequest {
        AccessRequest {
            resource,
            action,
            target: Target::Item {
                id: Uuid::new_v4(),
                owner,
            },
            payload_clinic_id: None,
        }
    }

    #[derive(Default)]
    struct InMemoryOwners {
        owners: HashMap<Uuid, Uuid>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl OwnershipLookup for InMemoryOwners {
        async fn owning_clinic(&self, id: Uuid) -> Result<Option<Uuid>, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.owners.get(&id).copied())
        }
    }

    fn gate_with(owners: HashMap<Uuid, Uuid>) -> (AccessGate, Arc<InMemoryOwners>) {
        let lookup = Arc::new(InMemoryOwners {
            owners,
            calls: AtomicUsize::new(0),
        });
        (AccessGate::new(lookup.clone()), lookup)
    }

    #[test]
    fn doctor_cannot_manage_clinics() {
        let doctor = identity(Role::Doctor, Some(Uuid::new_v4()));
        for action in [Action::List, Action::Create, Action::Update, Action::Delete] {
            let request = AccessRequest::collection(Resource::Clinic, action);
            assert_eq!(
                authorize(&doctor, &request),
                Decision::Deny(Denial::RoleNotPermitted)
            );
        }
    }

    #[test]
    fn admin_reads_clinics_but_cannot_write_them() {
        let admin = identity(Role::Admin, Some(Uuid::new_v4()));
        assert_eq!(
            authorize(&admin, &AccessRequest::collection(Resource::Clinic, Action::List)),
            Decision::Allow(TenantScope::All)
        );
        assert_eq!(
            authorize(&admin, &AccessRequest::collection(Resource::Clinic, Action::Create)),
            Decision::Deny(Denial::RoleNotPermitted)
        );
    }

    #[test]
    fn superadmin_bypasses_tenant_checks() {
        let root = identity(Role::Superadmin, None);
        let request = resolved(Resource::Patient, Action::Update, Ownership::Unresolved)
            .with_clinic(Some(Uuid::new_v4()));
        assert_eq!(authorize(&root, &request), Decision::Allow(TenantScope::All));
    }

    #[test]
    fn callers_without_clinic_are_denied_every_patient_operation() {
        for role in [Role::Admin, Role::Doctor] {
            let caller = identity(role, None);
            for action in [Action::List, Action::Read, Action::Create, Action::Update] {
                let request = AccessRequest::collection(Resource::Patient, action);
                assert_eq!(
                    authorize(&caller, &request),
                    Decision::Deny(Denial::NoClinicAssigned),
                    "{role:?} {action:?}"
                );
            }
        }
    }

    #[test]
    fn foreign_patient_is_forbidden_and_absent_patient_is_missing() {
        let clinic = Uuid::new_v4();
        let admin = identity(Role::Admin, Some(clinic));

        let foreign = resolved(Resource::Patient, Action::Read, Ownership::Clinic(Uuid::new_v4()));
        assert_eq!(authorize(&admin, &foreign), Decision::Deny(Denial::ForeignTenant));

        let absent = resolved(Resource::Patient, Action::Read, Ownership::Absent);
        assert_eq!(authorize(&admin, &absent), Decision::Deny(Denial::Missing));

        let own = resolved(Resource::Patient, Action::Read, Ownership::Clinic(clinic));
        assert_eq!(authorize(&admin, &own), Decision::Allow(TenantScope::Clinic(clinic)));
    }

    #[test]
    fn unresolved_owner_fails_closed() {
        let admin = identity(Role::Admin, Some(Uuid::new_v4()));
        let request = resolved(Resource::Patient, Action::Delete, Ownership::Unresolved);
        assert_eq!(authorize(&admin, &request), Decision::Deny(Denial::ForeignTenant));
    }

    #[test]
    fn create_without_clinic_injects_callers_clinic() {
        let clinic = Uuid::new_v4();
        let doctor = identity(Role::Doctor, Some(clinic));
        let request = AccessRequest::collection(Resource::Patient, Action::Create);
        assert_eq!(authorize(&doctor, &request), Decision::AllowWithTenant(clinic));
    }

    #[test]
    fn payload_for_another_clinic_is_forbidden() {
        let admin = identity(Role::Admin, Some(Uuid::new_v4()));
        let request = AccessRequest::collection(Resource::Patient, Action::Create)
            .with_clinic(Some(Uuid::new_v4()));
        assert_eq!(authorize(&admin, &request), Decision::Deny(Denial::ForeignTenant));
    }

    #[test]
    fn doctor_cannot_delete_patients() {
        let clinic = Uuid::new_v4();
        let doctor = identity(Role::Doctor, Some(clinic));
        let request = resolved(Resource::Patient, Action::Delete, Ownership::Clinic(clinic));
        assert_eq!(authorize(&doctor, &request), Decision::Deny(Denial::RoleNotPermitted));
    }

    #[tokio::test]
    async fn enforce_resolves_owner_and_rejects_foreign_patient() {
        let own = Uuid::new_v4();
        let other = Uuid::new_v4();
        let patient = Uuid::new_v4();
        let (gate, _) = gate_with(HashMap::from([(patient, other)]));
        let admin = identity(Role::Admin, Some(own));

        let err = gate
            .enforce(&admin, AccessRequest::item(Resource::Patient, Action::Read, patient))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(Denial::ForeignTenant)));
    }

    #[tokio::test]
    async fn enforce_reports_not_found_for_absent_patient() {
        let (gate, _) = gate_with(HashMap::new());
        let admin = identity(Role::Admin, Some(Uuid::new_v4()));

        let err = gate
            .enforce(
                &admin,
                AccessRequest::item(Resource::Patient, Action::Update, Uuid::new_v4()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("patient")));
    }

    #[tokio::test]
    async fn enforce_checks_role_before_touching_the_store() {
        let clinic = Uuid::new_v4();
        let patient = Uuid::new_v4();
        let (gate, lookup) = gate_with(HashMap::from([(patient, clinic)]));
        let doctor = identity(Role::Doctor, Some(clinic));

        let err = gate
            .enforce(&doctor, AccessRequest::item(Resource::Patient, Action::Delete, patient))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(Denial::RoleNotPermitted)));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn enforce_skips_lookup_for_superadmin() {
        let (gate, lookup) = gate_with(HashMap::new());
        let root = identity(Role::Superadmin, None);

        let grant = gate
            .enforce(&root, AccessRequest::item(Resource::Patient, Action::Read, Uuid::new_v4()))
            .await
            .unwrap();
        assert_eq!(grant.scope, TenantScope::All);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn enforce_update_of_own_patient_keeps_callers_clinic() {
        let clinic = Uuid::new_v4();
        let patient = Uuid::new_v4();
        let (gate, _) = gate_with(HashMap::from([(patient, clinic)]));
        let admin = identity(Role::Admin, Some(clinic));

        let grant = gate
            .enforce(&admin, AccessRequest::item(Resource::Patient, Action::Update, patient))
            .await
            .unwrap();
        assert_eq!(grant.clinic_id, Some(clinic));
        assert_eq!(grant.scope, TenantScope::Clinic(clinic));
    }
}
