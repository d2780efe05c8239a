mod common;

use std::time::Duration;

use common::*;
use org_server::services::EntityCache;
use org_server::{ErrorCode, OrgService, ServiceOptions};
use shared::error::ErrorKind;
use shared::models::{DepartmentCreate, DepartmentDelete, DepartmentQuery, DepartmentUpdate};

fn reparent(parent_id: Option<i64>) -> DepartmentUpdate {
    DepartmentUpdate {
        parent_id: Some(parent_id),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_moves_manager_into_new_department() {
    let env = setup().await;
    let root = found(&env, "Root", None).await;
    let ana = hire(&env, "Ana", root.department.id).await;

    let child = env
        .create_department(
            &ctx(),
            DepartmentCreate {
                name: " Finance ".into(),
                manager_id: ana.id,
                parent_id: Some(root.department.id),
            },
        )
        .await
        .unwrap();

    assert_eq!(child.name, "Finance");
    assert_eq!(child.parent_id, Some(root.department.id));
    let detail = env.get_employee(&ctx(), ana.id).await.unwrap();
    assert_eq!(detail.department_id, child.id);
    assert_eq!(detail.manager_id, ana.id);
}

#[tokio::test]
async fn test_create_rejects_bad_references() {
    let env = setup().await;
    let root = found(&env, "Root", None).await;
    let ana = hire(&env, "Ana", root.department.id).await;
    let create = |manager_id, parent_id| DepartmentCreate {
        name: "New".into(),
        manager_id,
        parent_id,
    };

    let err = assert_code(
        env.create_department(&ctx(), create(404, None)).await,
        ErrorCode::ManagerNotFound,
    );
    assert_eq!(err.kind(), ErrorKind::NotFound);

    assert_code(
        env.create_department(&ctx(), create(ana.id, Some(404))).await,
        ErrorCode::ParentDepartmentNotFound,
    );

    // One department per manager
    let err = assert_code(
        env.create_department(&ctx(), create(root.manager.id, None)).await,
        ErrorCode::EmployeeIsManager,
    );
    assert_eq!(err.kind(), ErrorKind::Conflict);

    // Nothing was written by the failed attempts
    let all = env
        .list_departments(&ctx(), DepartmentQuery::default())
        .await
        .unwrap();
    assert_eq!(all.total, 1);
}

#[tokio::test]
async fn test_reparent_under_descendant_is_a_cycle() {
    let env = setup().await;
    let a = found(&env, "A", None).await.department;
    let b = found(&env, "B", Some(a.id)).await.department;
    let c = found(&env, "C", Some(b.id)).await.department;
    let other = found(&env, "Other", None).await.department;

    for target in [b.id, c.id, a.id] {
        let err = assert_code(
            env.update_department(&ctx(), a.id, reparent(Some(target))).await,
            ErrorCode::HierarchyCycle,
        );
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    let moved = env
        .update_department(&ctx(), a.id, reparent(Some(other.id)))
        .await
        .unwrap();
    assert_eq!(moved.parent_id, Some(other.id));

    let chain: Vec<i64> = env
        .get_ancestors(&ctx(), c.id)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(chain, vec![b.id, a.id, other.id]);

    let root = env.update_department(&ctx(), a.id, reparent(None)).await.unwrap();
    assert_eq!(root.parent_id, None);
    assert!(env.get_ancestors(&ctx(), a.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reparent_to_missing_parent() {
    let env = setup().await;
    let a = found(&env, "A", None).await.department;

    assert_code(
        env.update_department(&ctx(), a.id, reparent(Some(12345))).await,
        ErrorCode::ParentDepartmentNotFound,
    );
    assert_code(
        env.update_department(&ctx(), 12345, reparent(None)).await,
        ErrorCode::DepartmentNotFound,
    );
}

#[tokio::test]
async fn test_manager_change_pulls_in_outsider() {
    let env = setup().await;
    let ops = found(&env, "Ops", None).await;
    let sales = found(&env, "Sales", None).await;
    let outsider = hire(&env, "Outsider", sales.department.id).await;

    let updated = env
        .update_department(
            &ctx(),
            ops.department.id,
            DepartmentUpdate {
                manager_id: Some(outsider.id),
                name: Some("Operations".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.manager_id, outsider.id);
    assert_eq!(updated.name, "Operations");

    let detail = env.get_employee(&ctx(), outsider.id).await.unwrap();
    assert_eq!(detail.department_id, ops.department.id);
    // The previous manager stays on as a member
    let previous = env.get_employee(&ctx(), ops.manager.id).await.unwrap();
    assert_eq!(previous.department_id, ops.department.id);
    assert_eq!(previous.manager_id, outsider.id);

    // Sales' manager already runs a department
    assert_code(
        env.update_department(
            &ctx(),
            ops.department.id,
            DepartmentUpdate {
                manager_id: Some(sales.manager.id),
                ..Default::default()
            },
        )
        .await,
        ErrorCode::EmployeeIsManager,
    );
}

#[tokio::test]
async fn test_manager_change_without_reassignment() {
    let env = setup().await;
    let strict = OrgService::new(
        env.db.pool.clone(),
        EntityCache::new(0, Duration::from_secs(1)),
        ServiceOptions {
            reassign_manager_on_update: false,
        },
    );
    let ops = found(&strict, "Ops", None).await;
    let sales = found(&strict, "Sales", None).await;
    let outsider = hire(&strict, "Outsider", sales.department.id).await;
    let member = hire(&strict, "Member", ops.department.id).await;

    let change = |manager_id| DepartmentUpdate {
        manager_id: Some(manager_id),
        ..Default::default()
    };
    let err = assert_code(
        strict
            .update_department(&ctx(), ops.department.id, change(outsider.id))
            .await,
        ErrorCode::ManagerNotInDepartment,
    );
    assert_eq!(err.kind(), ErrorKind::Validation);

    let updated = strict
        .update_department(&ctx(), ops.department.id, change(member.id))
        .await
        .unwrap();
    assert_eq!(updated.manager_id, member.id);
}

#[tokio::test]
async fn test_delete_rejects_dependents() {
    let env = setup().await;
    let a = found(&env, "A", None).await;
    let b = found(&env, "B", Some(a.department.id)).await;

    let err = assert_code(
        env.delete_department(&ctx(), a.department.id, DepartmentDelete::default())
            .await,
        ErrorCode::DepartmentHasChildren,
    );
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let member = hire(&env, "Member", b.department.id).await;
    assert_code(
        env.delete_department(&ctx(), b.department.id, DepartmentDelete::default())
            .await,
        ErrorCode::DepartmentHasMembers,
    );

    env.delete_employee(&ctx(), member.id).await.unwrap();
    env.delete_department(&ctx(), b.department.id, DepartmentDelete::default())
        .await
        .unwrap();

    // B's manager landed in the parent
    let manager = env.get_employee(&ctx(), b.manager.id).await.unwrap();
    assert_eq!(manager.department_id, a.department.id);
    assert_code(
        env.get_department(&ctx(), b.department.id).await,
        ErrorCode::DepartmentNotFound,
    );
}

#[tokio::test]
async fn test_delete_root_needs_manager_destination() {
    let env = setup().await;
    let lonely = found(&env, "Lonely", None).await;
    let other = found(&env, "Other", None).await;
    let id = lonely.department.id;

    assert_code(
        env.delete_department(&ctx(), id, DepartmentDelete::default()).await,
        ErrorCode::ManagerReassignmentRequired,
    );
    assert_code(
        env.delete_department(
            &ctx(),
            id,
            DepartmentDelete {
                reassign_manager_to: Some(id),
                remove_manager: false,
            },
        )
        .await,
        ErrorCode::InvalidRequest,
    );
    assert_code(
        env.delete_department(
            &ctx(),
            id,
            DepartmentDelete {
                reassign_manager_to: Some(999),
                remove_manager: false,
            },
        )
        .await,
        ErrorCode::DepartmentNotFound,
    );
    // Failed attempts left the department in place
    env.get_department(&ctx(), id).await.unwrap();

    env.delete_department(
        &ctx(),
        id,
        DepartmentDelete {
            reassign_manager_to: Some(other.department.id),
            remove_manager: false,
        },
    )
    .await
    .unwrap();
    let moved = env.get_employee(&ctx(), lonely.manager.id).await.unwrap();
    assert_eq!(moved.department_id, other.department.id);
}

#[tokio::test]
async fn test_delete_root_with_its_manager() {
    let env = setup().await;
    let lonely = found(&env, "Lonely", None).await;

    env.delete_department(
        &ctx(),
        lonely.department.id,
        DepartmentDelete {
            reassign_manager_to: None,
            remove_manager: true,
        },
    )
    .await
    .unwrap();

    assert_code(
        env.get_employee(&ctx(), lonely.manager.id).await,
        ErrorCode::EmployeeNotFound,
    );
    assert_code(
        env.get_department(&ctx(), lonely.department.id).await,
        ErrorCode::DepartmentNotFound,
    );
}

#[tokio::test]
async fn test_tree_view_tracks_new_children() {
    let env = setup().await;
    let a = found(&env, "A", None).await.department;

    let tree = env.get_department(&ctx(), a.id).await.unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.manager.name, "A Manager");

    let zeta = found(&env, "Zeta", Some(a.id)).await.department;
    let beta = found(&env, "Beta", Some(a.id)).await.department;
    let leaf = found(&env, "Leaf", Some(zeta.id)).await.department;

    let tree = env.get_department(&ctx(), a.id).await.unwrap();
    assert_eq!(tree.ids(), vec![a.id, beta.id, zeta.id, leaf.id]);

    let mut subtree = env.list_subdepartment_ids(&ctx(), zeta.id).await.unwrap();
    subtree.sort();
    let mut expected = vec![zeta.id, leaf.id];
    expected.sort();
    assert_eq!(subtree, expected);
}

#[tokio::test]
async fn test_list_departments_filters_by_manager_name() {
    let env = setup().await;
    let a = found(&env, "Alpha", None).await.department;
    found(&env, "Beta", Some(a.id)).await;
    found(&env, "Gamma", Some(a.id)).await;

    let by_manager = env
        .list_departments(
            &ctx(),
            DepartmentQuery {
                manager_name: Some("beta manager".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_manager.total, 1);
    assert_eq!(by_manager.data[0].name, "Beta");

    let children = env
        .list_departments(
            &ctx(),
            DepartmentQuery {
                parent_id: Some(a.id),
                page_size: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(children.total, 2);
    assert_eq!(children.total_pages, 2);
    assert_eq!(children.data[0].name, "Beta");
}

#[tokio::test]
async fn test_department_names_fold_accents() {
    let env = setup().await;
    let root = found(&env, "Raiz", None).await.department;
    let zeladoria = found(&env, "Zeladoria", Some(root.id)).await.department;
    let etica = found(&env, "Ética", Some(root.id)).await.department;

    let tree = env.get_department(&ctx(), root.id).await.unwrap();
    assert_eq!(tree.ids(), vec![root.id, etica.id, zeladoria.id]);

    let by_name = env
        .list_departments(
            &ctx(),
            DepartmentQuery {
                name: Some("ETICA".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_name.total, 1);
    assert_eq!(by_name.data[0].id, etica.id);

    let by_manager = env
        .list_departments(
            &ctx(),
            DepartmentQuery {
                manager_name: Some("ética manager".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_manager.total, 1);

    let children = env
        .list_departments(
            &ctx(),
            DepartmentQuery {
                parent_id: Some(root.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let order: Vec<&str> = children.data.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(order, ["Ética", "Zeladoria"]);
}
